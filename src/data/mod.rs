//! Data layer: core types, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  sales .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse rows, dates → SalesDataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ DatasetSource │  load once, Arc<SalesDataset>
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  month / date / city predicates → Vec<&Transaction>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate │  sum / mean / count / top / correlation per group
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod source;
