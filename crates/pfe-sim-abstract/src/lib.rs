pub mod config;
pub mod corpus;
pub mod error;
pub mod interface;
pub mod network;
pub mod overrides;
pub mod request;
pub mod totals;

pub use config::{BucketConfig, ConfigError, CostConfig, SimConfig, WorkerConfig};
pub use corpus::{DataSet, FontUsage, PageContent, PageView, PageViewSequence, UsageByFont};
pub use error::{Result, SimError};
pub use interface::{
    FontStore, MethodEntry, NetworkSensitivity, PfeMethod, PfeSession, SessionResources,
    SizeCache,
};
pub use network::NetworkModel;
pub use overrides::{BucketOverride, CostOverride, SimConfigOverride};
pub use request::{GraphBuilder, Request, RequestGraph, RequestId};
pub use totals::{GraphTotal, SequenceTotals};
