pub mod device_store;
pub mod envelope;
pub mod gateway;
pub mod kaspi;
pub mod metrics;

pub use device_store::{
    DeviceRecord, DeviceTokenStore, InMemoryDeviceTokenStore, MongoDeviceTokenStore, StoreError,
};
pub use envelope::EnvelopeClient;
pub use gateway::PaymentGateway;
pub use kaspi::{KaspiClient, KaspiProvider};
pub use metrics::{get_metrics, init_metrics};
