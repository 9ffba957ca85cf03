/// Something that can put text on the system clipboard.
pub trait CopyTool: Send + Sync {
    /// Name used in messages and logs.
    fn name(&self) -> &str;

    /// Cheap presence check; must not touch the clipboard.
    fn is_available(&self) -> bool;

    fn copy_text(&self, text: &str) -> Result<(), ToolError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The program could not be started at all.
    NotFound,
    Failed(String),
}
