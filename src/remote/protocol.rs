//! Controller wire protocol
//!
//! Commands are raw UTF-8 words (`Right`, `Left`, `Jump`, `Attack`). A
//! controller may send one command per write with no delimiter, or several
//! newline-delimited commands in one write; both decode the same way.

use crate::game::input::{RemoteCommand, UnknownCommand};

/// Largest single read from a controller socket
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Split a received chunk into commands. Blank lines are skipped.
pub fn decode_chunk(chunk: &str) -> impl Iterator<Item = Result<RemoteCommand, UnknownCommand>> + '_ {
    chunk
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_command_without_delimiter() {
        let decoded: Vec<_> = decode_chunk("Jump").collect();
        assert_eq!(decoded, vec![Ok(RemoteCommand::Jump)]);
    }

    #[test]
    fn newline_delimited_batch_keeps_order() {
        let decoded: Vec<_> = decode_chunk("Right\r\nLeft\n\nAttack\n").collect();
        assert_eq!(
            decoded,
            vec![
                Ok(RemoteCommand::Right),
                Ok(RemoteCommand::Left),
                Ok(RemoteCommand::Attack),
            ]
        );
    }

    #[test]
    fn unknown_words_are_reported_individually() {
        let decoded: Vec<_> = decode_chunk("Dance\nJump").collect();
        assert_eq!(decoded[0], Err(UnknownCommand("Dance".to_string())));
        assert_eq!(decoded[1], Ok(RemoteCommand::Jump));
    }
}
