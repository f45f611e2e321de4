//! Event bus adapters.
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus for tests and local runs
//! - `RedisEventSubscriber` - Redis pub/sub transport for production

mod in_memory;
mod redis_subscriber;

pub use in_memory::InMemoryEventBus;
pub use redis_subscriber::RedisEventSubscriber;
