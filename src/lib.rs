//! # Kaiwa - Conversation Flow Builder
//!
//! **Kaiwa** assembles declarative conversation flows for voice agents: nodes
//! (conversational states), edges with transition conditions, and webhook
//! tools with typed parameter schemas. Flows are validated as a whole graph and
//! serialized into the document format a voice-agent platform accepts.
//!
//! ## Core Workflow
//!
//! 1.  **Assemble**: add nodes and tools to a [`FlowBuilder`](builder::FlowBuilder),
//!     or render a [`FlowTemplate`](template::FlowTemplate) with your settings.
//! 2.  **Build**: `build()` checks that every edge resolves, exactly one node is
//!     the start node, every tool reference exists and every schema is
//!     consistent. It returns an immutable [`Flow`](flow::Flow).
//! 3.  **Serialize**: `flow.to_document()` gives the wire document; edge and
//!     property order are kept exactly as declared.
//! 4.  **Deploy**: hand the flow to a [`FlowDeployer`](deploy::FlowDeployer).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kaiwa::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let mut builder = FlowBuilder::new();
//! builder
//!     .set_global_prompt("You are Bea, a course advisor.")
//!     .set_language("es-ES")
//!     .set_voice("custom_voice_1");
//!
//! builder.add_node(
//!     Node::conversation("welcome", "Welcome", "Ask whether now is a good time.")
//!         .start()
//!         .edge(Edge::prompt("yes", "qualify", "The user has time")?)
//!         .edge(Edge::prompt("no", "callback", "The user is busy")?)
//!         .build()?,
//! )?;
//! builder.add_node(Node::end("qualify", "Qualify", "Great, let's continue.").build()?)?;
//! builder.add_node(Node::end("callback", "Callback", "We will call you back.").build()?)?;
//!
//! let flow = builder.build()?;
//! println!("{}", flow.to_document().to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod deploy;
pub mod document;
pub mod error;
pub mod flow;
pub mod outline;
pub mod prelude;
pub mod settings;
pub mod template;
