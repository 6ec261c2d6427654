//! Filter and aggregate pipeline behind the sales dashboard.
//!
//! [`data`] loads the transaction CSV and provides the filters and group-by
//! aggregations; [`state`] holds a user's filter selection and [`report`]
//! turns it into the input of every dashboard chart.

pub mod data;
pub mod error;
pub mod report;
pub mod state;
