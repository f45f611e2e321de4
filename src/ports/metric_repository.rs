//! MetricRepository port - Persistence of per-user metric aggregates.
//!
//! One document per user. Implementations must make `save` atomic for a
//! single aggregate; no multi-document guarantee is assumed.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::metrics::{MetricAggregate, MetricsError};

/// Store for [`MetricAggregate`]s keyed by user id.
///
/// `save` replaces any existing aggregate for the same user. Concurrent
/// writers for the same user are not arbitrated here: the last write wins.
#[async_trait]
pub trait MetricRepository: Send + Sync {
    /// Loads the aggregate for `user_id`, or `None` if the user has none.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<MetricAggregate>, MetricsError>;

    /// Persists `aggregate` and returns the stored value.
    async fn save(&self, aggregate: &MetricAggregate) -> Result<MetricAggregate, MetricsError>;
}
