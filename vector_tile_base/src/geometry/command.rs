use crate::VectorTileError;
use anyhow::{Result, bail};

/// Drawing instruction at the head of every command integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
	MoveTo,
	LineTo,
	ClosePath,
}

impl Command {
	pub fn id(self) -> u64 {
		match self {
			Command::MoveTo => 1,
			Command::LineTo => 2,
			Command::ClosePath => 7,
		}
	}

	/// Packs the command id and a repeat count: `(id & 0x7) | (count << 3)`.
	pub fn encode(self, count: u64) -> u64 {
		(self.id() & 0x7) | (count << 3)
	}

	/// Splits a command integer into command and count.
	pub fn decode(value: u64) -> Result<(Command, u64)> {
		let command = match value & 0x7 {
			1 => Command::MoveTo,
			2 => Command::LineTo,
			7 => Command::ClosePath,
			id => bail!(VectorTileError::MalformedGeometry(format!("unknown command id {id}"))),
		};
		Ok((command, value >> 3))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Command::MoveTo, 1, 9)]
	#[case(Command::MoveTo, 3, 25)]
	#[case(Command::LineTo, 1, 10)]
	#[case(Command::LineTo, 0, 2)]
	#[case(Command::ClosePath, 1, 15)]
	fn encode_decode(#[case] command: Command, #[case] count: u64, #[case] value: u64) -> Result<()> {
		assert_eq!(command.encode(count), value);
		assert_eq!(Command::decode(value)?, (command, count));
		Ok(())
	}

	#[rstest]
	#[case(0)]
	#[case(3)]
	#[case(4 | (1 << 3))]
	#[case(6)]
	fn unknown_command(#[case] value: u64) {
		let error = Command::decode(value).unwrap_err();
		assert!(matches!(
			error.downcast_ref::<VectorTileError>(),
			Some(VectorTileError::MalformedGeometry(_))
		));
	}
}
