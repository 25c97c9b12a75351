//! Bundler engine: fetching, caching and document rewriting.
mod agent;
mod assemble;
mod cache;
mod decode;
mod dom;
mod engine;
mod fetch;
mod filename;
mod inline;
mod persist;
mod provenance;
mod report;
mod types;

pub use agent::{Agent, BundleOptions, Clock};
pub use cache::{FetchCache, MemoryCache};
pub use decode::{decode_text, DecodedText};
pub use dom::{Doctype, Document, DomNode, ElementData};
pub use engine::{EngineConfig, EngineHandle};
pub use fetch::{FetchSettings, ReqwestTransport, Transport, BROWSER_USER_AGENT};
pub use filename::{bundle_dir_name, BUNDLE_FILENAME};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use provenance::{build_provenance_comment, ctime_now};
pub use report::{write_report, JobReport, ReportError, RunReport, REPORT_FILENAME};
pub use types::{
    BundleError, BundleOutput, Content, Credentials, EngineEvent, FailureKind, FetchError,
    FetchMetadata, FetchOutput, Fetched, JobId,
};
