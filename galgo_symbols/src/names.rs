//! Fixed identifiers the scanner matches against. These are fully-qualified
//! names, never type identity, so the check works across assembly
//! boundaries.

/// Assembly that declares the engine's base types.
pub const ENGINE_ASSEMBLY: &str = "GodotSharp";

/// Every scanned class must reach this type through its base chain.
pub const ROOT_OBJECT: &str = "Godot.GodotObject";

/// Marks an ordinary method as a remote-call target.
pub const RPC_ATTR: &str = "Godot.RpcAttribute";

/// Marks a nested delegate as an event-signal target.
pub const SIGNAL_ATTR: &str = "Godot.SignalAttribute";

/// Marks a field or property for node-lookup accessor generation.
pub const AUTO_GET_ATTR: &str = "Galgo.Attributes.AutoGetAttribute";

/// Marks a class for autoload-registry registration.
pub const AUTOLOAD_GET_ATTR: &str = "Galgo.Attributes.AutoloadGetAttribute";

/// Marks a field for change-notifying property generation.
pub const NOTIFY_ATTR: &str = "Galgo.Attributes.NotifyAttribute";
