// Visual elements

pub mod dialog;
pub mod tabs;

pub use dialog::{Dialog, DialogConfig, DialogContent, DialogDescription, DialogTitle, DialogTrigger};
pub use tabs::{TabItemSpec, Tabs, TabsConfig, TabsContent, TabsList, TabsSpec, TabsTrigger};
