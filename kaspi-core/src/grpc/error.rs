//! Rendering of translated errors as `tonic::Status`.
//!
//! | ErrorKind | gRPC Status |
//! |-----------|-------------|
//! | `NotFound` | `NOT_FOUND` |
//! | `Conflict` | `ALREADY_EXISTS` |
//! | `InvalidInput` | `INVALID_ARGUMENT` |
//! | `PreconditionFailed` | `FAILED_PRECONDITION` |
//! | `PermissionDenied` | `PERMISSION_DENIED` |
//! | `Unauthenticated` | `UNAUTHENTICATED` |
//! | `Unavailable` | `UNAVAILABLE` |
//! | `Internal` | `INTERNAL` |
//! | `Unknown` | `UNKNOWN` |

use tonic::{Code, Status};

use crate::error::{ErrorKind, ErrorOutcome, GatewayError};

impl ErrorKind {
    pub fn grpc_code(&self) -> Code {
        match self {
            ErrorKind::NotFound => Code::NotFound,
            ErrorKind::Conflict => Code::AlreadyExists,
            ErrorKind::InvalidInput => Code::InvalidArgument,
            ErrorKind::PreconditionFailed => Code::FailedPrecondition,
            ErrorKind::PermissionDenied => Code::PermissionDenied,
            ErrorKind::Unauthenticated => Code::Unauthenticated,
            ErrorKind::Unavailable => Code::Unavailable,
            ErrorKind::Internal => Code::Internal,
            ErrorKind::Unknown => Code::Unknown,
        }
    }
}

/// Extension trait for converting types into `tonic::Status`.
pub trait IntoStatus {
    fn into_status(self) -> Status;
}

impl IntoStatus for ErrorOutcome {
    fn into_status(self) -> Status {
        Status::new(self.kind.grpc_code(), self.message)
    }
}

impl IntoStatus for GatewayError {
    fn into_status(self) -> Status {
        self.log_hidden_detail();
        self.outcome().into_status()
    }
}

impl From<GatewayError> for Status {
    fn from(err: GatewayError) -> Self {
        err.into_status()
    }
}

/// Result type alias for gRPC handlers.
pub type GrpcResult<T> = Result<tonic::Response<T>, Status>;
