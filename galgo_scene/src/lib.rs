pub mod lexer;
pub mod parser;

pub use lexer::HeaderLexer;
pub use parser::{
    ROOT_NODE, SCRIPT_EXTENSION, SceneAsset, SceneTag, TagKind, parse_scene,
};
