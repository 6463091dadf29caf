//! Abstract fluent model: trie keys, the trie itself, and the method/step
//! graph handed to a renderer.

pub mod metadata;
pub mod method;
pub mod parameter;
pub mod step;
pub mod trie;
pub mod unit;

pub use metadata::{ConstructorMetadata, ValueStorage};
pub use method::{
    ConverterRef, CreationMethod, FluentMethod, FluentReturn, MethodParameter, MethodSignature,
    MultiMethod, RegularMethod, SourceParameter, TargetTypeReturn,
};
pub use parameter::{FluentMethodParameter, FluentType};
pub use step::{ExistingTypeFluentStep, FluentStep, KnownParameter, RegularFluentStep, StepId};
pub use trie::{NodeId, Trie, TrieNode};
pub use unit::{ConstructorSummary, FluentFactoryCompilationUnit};
