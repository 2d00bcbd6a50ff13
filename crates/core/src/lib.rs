//! Shared building blocks for the shopkeep client.
//!
//! Pure value helpers (money, ids, errors) plus the output-file boundary that
//! every export and print path writes through.

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod sink;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, CustomerId, OrderId, ProductId};
pub use money::{CurrencyStyle, Totals, format_inr, percent_of, round_currency, whole_units};
pub use sink::{DirectorySink, FileSink, MemorySink, SavedFile, SinkError};
