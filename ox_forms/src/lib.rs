//! Schema-driven forms: field schemas, live form state, validation and the
//! conversion of values between the UI and the backend wire format.

pub mod error;
pub mod schema;
pub mod value;
pub mod validation;
pub mod state;
pub mod mapping;
pub mod binding;
pub mod transform;
pub mod display;
pub mod forms;
pub mod registry;

pub use error::{FormError, ValidationError};
pub use schema::{FieldDescriptor, FieldKind, OptionItem, ValidationRule};
pub use value::FieldValue;
pub use state::{FormControl, FormState, RequestTicket};
pub use mapping::FieldNameMap;
pub use binding::{CoercionTable, FormSynthesizer, Record};
pub use transform::{OptionPolicy, WireTransformer};
pub use registry::{FileSchemaSource, SchemaRegistry, SchemaSource, StaticSchemaSource};
