//! Prelude module for convenient imports
//!
//! Re-exports the types and traits needed to assemble, build, serialize and
//! deploy a flow.
//!
//! # Example
//!
//! ```rust,no_run
//! use kaiwa::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let flow = FlowTemplate::esi_design_school()?.render_flow(&FlowSettings::default())?;
//! println!("{}", flow.outline());
//! std::fs::write("flow.json", flow.to_document().to_json_pretty()?).ok();
//! # Ok(())
//! # }
//! ```

// Model
pub use crate::flow::{
    ComparisonOperator, DisplayPosition, Edge, Equation, Flow, HttpMethod, Instruction,
    LogicalOperator, ModelChoice, Node, NodeBuilder, NodeType, ObjectSchema, ParameterEncoding,
    ParameterSchema, PropertySchema, Speaker, Tool, ToolBuilder, ToolKind, TransferOption,
    TransitionCondition, Validate, Variable, VariableType,
};

// Assembly and conversion
pub use crate::builder::FlowBuilder;
pub use crate::document::{FlowDocument, IntoFlow};
pub use crate::settings::{AgentSettings, FlowSettings};
pub use crate::template::FlowTemplate;

// Deployment
pub use crate::deploy::{AgentRequest, DeployReceipt, FileDeployer, FlowDeployer, MemoryDeployer, deploy_flow};

// Errors
pub use crate::error::{
    BuildError, ConversionError, DeployError, DuplicateIdError, FlowError, GraphIntegrityError,
    SchemaError, SerializationError, ValidationError,
};

/// Result defaulting to the crate's umbrella error.
pub type Result<T, E = FlowError> = std::result::Result<T, E>;
