/*!
This crate contains the small pieces shared by every other crate in the workspace: the error type and `err!` macro, the `Finite` wrapper used to order floats, number formatting for display, a plain text table, and the hyper serve loop.
*/

pub mod error;
pub mod finite;
pub mod format;
pub mod serve;
pub mod table;
