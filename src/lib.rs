pub mod error;
pub mod config;
pub mod catalog;
pub mod request;
pub mod transport;
pub mod gateway;
pub mod stats;
pub mod session;

/*

promptopt rewrites a prompt through a chat-completion endpoint using
one of a few fixed instruction templates.

promptopt/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports
│   ├── error.rs        # Error type and caller-facing ErrorKind
│   ├── config.rs       # Endpoint, credential, model, timeout
│   ├── catalog.rs      # Mode -> ModeSpec, instructions as data
│   ├── request.rs      # CompletionRequest + wire types
│   ├── transport.rs    # Transport trait, reqwest implementation
│   ├── gateway.rs      # One request -> one call -> one result
│   ├── stats.rs        # Length statistics
│   ├── session.rs      # Form actions, report, download file
│   └── main.rs         # CLI front end
└── tests/              # Gateway/session tests over a stub transport

*/

pub use catalog::{Mode, ModeSpec, TemplateCatalog};
pub use config::GatewayConfig;
pub use error::{Error, ErrorKind};
pub use gateway::CompletionGateway;
pub use request::{CompletionRequest, CompletionResult};
pub use session::{Completion, Outcome, Session};
pub use stats::LengthStats;
pub use transport::{HttpTransport, Transport, TransportResponse};
