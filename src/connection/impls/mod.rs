/// The RMCP/IPMB transport implementation.
pub mod rmcp;
