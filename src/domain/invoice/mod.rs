pub mod entities;
pub mod errors;
pub mod ports;
pub mod search;
pub mod services;
pub mod value_objects;

pub use entities::{Invoice, InvoiceData, InvoiceId, NewInvoice};
pub use errors::InvoiceError;
pub use ports::InvoiceRepository;
pub use search::{InvoiceSearch, PAGE_SIZE, Page, PageRequest};
pub use services::InvoiceService;
pub use value_objects::{
  InvoiceNumber, NetAmount, Nip, NipRole, ProductName, ValueObjectError,
};
