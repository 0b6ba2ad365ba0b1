use crate::connection::{CompletionErrorCode, NetFn};

/// An error that can occur while sending an [`IpmiCommand`](crate::connection::IpmiCommand)
/// and receiving/parsing its response.
///
/// `CON` is the underlying connection's error type; `P` is the command's
/// own parse-error type.
#[derive(Clone, Debug, PartialEq)]
pub enum IpmiError<CON, P> {
    /// The response did not match the netfn/cmd of the request that was sent.
    UnexpectedResponse {
        netfn_sent: NetFn,
        netfn_recvd: NetFn,
        cmd_sent: u8,
        cmd_recvd: u8,
    },
    /// The completion code indicated failure, and the command provided
    /// special handling for it.
    Command {
        error: P,
        netfn: NetFn,
        cmd: u8,
        completion_code: Option<CompletionErrorCode>,
        data: Vec<u8>,
    },
    /// The completion code indicated failure, and the command had no
    /// special handling for it.
    Failed {
        netfn: NetFn,
        cmd: u8,
        completion_code: CompletionErrorCode,
        data: Vec<u8>,
    },
    /// An error occurred at the transport/connection level.
    Connection(CON),
}

impl<CON, P> From<CON> for IpmiError<CON, P> {
    fn from(value: CON) -> Self {
        Self::Connection(value)
    }
}

impl<CON, P> IpmiError<CON, P> {
    pub fn map<CON2, F>(self, f: F) -> IpmiError<CON2, P>
    where
        F: FnOnce(CON) -> CON2,
    {
        match self {
            IpmiError::UnexpectedResponse {
                netfn_sent,
                netfn_recvd,
                cmd_sent,
                cmd_recvd,
            } => IpmiError::UnexpectedResponse {
                netfn_sent,
                netfn_recvd,
                cmd_sent,
                cmd_recvd,
            },
            IpmiError::Command {
                error,
                netfn,
                cmd,
                completion_code,
                data,
            } => IpmiError::Command {
                error,
                netfn,
                cmd,
                completion_code,
                data,
            },
            IpmiError::Failed {
                netfn,
                cmd,
                completion_code,
                data,
            } => IpmiError::Failed {
                netfn,
                cmd,
                completion_code,
                data,
            },
            IpmiError::Connection(e) => IpmiError::Connection(f(e)),
        }
    }
}
