//! Bill/invoice document generation.
//!
//! A pure function of its input: an [`Invoice`] plus a [`CompanyProfile`]
//! become PDF bytes. Saving and printing go through caller-supplied
//! capabilities and never modify the invoice.

pub mod company;
pub mod invoice;
pub mod layout;
pub mod print;
pub mod words;

pub use company::CompanyProfile;
pub use invoice::{BillTo, Invoice, InvoiceDraft, LineItem};
pub use layout::{BillLayout, RowPlacement, layout_bill};
pub use print::{
    BillError, BillGenerator, CommandViewer, PrintOutcome, PrintViewer, ViewerError, generate,
};
pub use words::{amount_in_words, rupees_in_words};
