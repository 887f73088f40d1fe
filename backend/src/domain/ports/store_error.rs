//! Error type shared by the human and payroll store ports.

use super::define_port_error;

define_port_error! {
    /// Errors raised by store session adapters.
    pub enum StoreError {
        /// A connection could not be checked out or was lost.
        Connection { message: String } => "store connection failed: {message}",
        /// A read failed during execution.
        Query { message: String } => "store query failed: {message}",
        /// Applying the staged writes failed; nothing from the batch landed.
        Commit { message: String } => "store commit failed: {message}",
    }
}
