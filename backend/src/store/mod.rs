//! In-memory stores shared by the HTTP handlers.
//!
//! Each store is a clonable handle around `Arc<RwLock<..>>`, injected into the
//! app as `web::Data` in the same way as the job state.

mod catalog;
mod sessions;
mod templates;

pub use catalog::VariableCatalog;
pub use sessions::SessionStore;
pub use templates::TemplateStore;
