//! Command stream encoding and decoding.
//!
//! A [`CommandStream`] owns the raw command integers of one feature together with the cursor,
//! the absolute position of the last encoded point. Coordinates are stored as zigzag coded deltas
//! against that cursor, so appending to a stream that was decoded from bytes first replays it once
//! to find where the cursor stands.

use super::command::Command;
use crate::{FeatureKind, VectorTileError, zigzag};
use anyhow::{Result, anyhow};
use log::trace;

/// One absolute position with one value per dimension.
pub type Coordinates = Vec<i64>;
/// A flat list of positions, also used for a single line string or ring.
pub type Points = Vec<Coordinates>;
pub type LineStrings = Vec<Points>;
/// Polygon groups, each an exterior ring followed by its holes.
pub type Polygons = Vec<Vec<Points>>;

fn malformed(message: impl Into<String>) -> anyhow::Error {
	anyhow!(VectorTileError::MalformedGeometry(message.into()))
}

#[derive(Clone, Debug)]
pub struct CommandStream {
	data: Vec<u64>,
	dimensions: usize,
	cursor: Vec<i64>,
	last_command: Option<usize>,
	cursor_at_end: bool,
}

impl PartialEq for CommandStream {
	fn eq(&self, other: &Self) -> bool {
		self.dimensions == other.dimensions && self.data == other.data
	}
}

impl CommandStream {
	pub fn new(dimensions: usize) -> CommandStream {
		CommandStream {
			data: Vec::new(),
			dimensions,
			cursor: vec![0; dimensions],
			last_command: None,
			cursor_at_end: true,
		}
	}

	/// Wraps an existing stream; the cursor is positioned lazily on the first append.
	pub fn from_data(data: Vec<u64>, dimensions: usize) -> CommandStream {
		CommandStream {
			data,
			dimensions,
			cursor: vec![0; dimensions],
			last_command: None,
			cursor_at_end: false,
		}
	}

	pub fn data(&self) -> &[u64] {
		&self.data
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn clear(&mut self) {
		self.data.clear();
		self.cursor = vec![0; self.dimensions];
		self.last_command = None;
		self.cursor_at_end = true;
	}

	/// Replays the stream to move the cursor behind the last encoded point.
	fn sync_cursor(&mut self) -> Result<()> {
		if self.cursor_at_end {
			return Ok(());
		}

		let mut cursor = vec![0i64; self.dimensions];
		let mut last_command = None;
		let mut position = 0;
		while position < self.data.len() {
			let (command, count) = Command::decode(self.data[position])?;
			last_command = Some(position);
			position += 1;
			if command == Command::ClosePath {
				continue;
			}
			for _ in 0..count {
				for value in &mut cursor {
					let delta = self
						.data
						.get(position)
						.ok_or_else(|| malformed("stream ends inside a coordinate"))?;
					*value = value.wrapping_add(zigzag::decode(*delta));
					position += 1;
				}
			}
		}

		self.cursor = cursor;
		self.last_command = last_command;
		self.cursor_at_end = true;
		Ok(())
	}

	fn check_arity<P: AsRef<[i64]>>(&self, points: &[P]) -> Result<()> {
		for (index, point) in points.iter().enumerate() {
			let arity = point.as_ref().len();
			if arity != self.dimensions {
				return Err(malformed(format!(
					"point {index} has {arity} coordinates, but the feature has {} dimensions",
					self.dimensions
				)));
			}
		}
		Ok(())
	}

	fn stage_points<P: AsRef<[i64]>>(points: &[P], cursor: &mut [i64], scratch: &mut Vec<u64>) {
		for point in points {
			for (value, coordinate) in cursor.iter_mut().zip(point.as_ref()) {
				scratch.push(zigzag::encode(coordinate.wrapping_sub(*value)));
				*value = *coordinate;
			}
		}
	}

	fn commit(&mut self, scratch: Vec<u64>, cursor: Vec<i64>, last_command: usize) {
		self.data.extend(scratch);
		self.cursor = cursor;
		self.last_command = Some(last_command);
	}

	/// Appends points to a point stream, extending the trailing MoveTo instead of opening a new one.
	pub fn push_points<P: AsRef<[i64]>>(&mut self, points: &[P]) -> Result<()> {
		self.check_arity(points)?;
		if points.is_empty() {
			return Ok(());
		}
		self.sync_cursor()?;

		let mut cursor = self.cursor.clone();
		let mut scratch = Vec::with_capacity(points.len() * self.dimensions + 1);

		let trailing_move_to = match self.last_command {
			Some(index) => match Command::decode(self.data[index])? {
				(Command::MoveTo, count) => Some((index, count)),
				_ => None,
			},
			None => None,
		};

		let header = match trailing_move_to {
			Some((index, count)) => {
				self.data[index] = Command::MoveTo.encode(count + points.len() as u64);
				index
			}
			None => {
				scratch.push(Command::MoveTo.encode(points.len() as u64));
				self.data.len()
			}
		};

		CommandStream::stage_points(points, &mut cursor, &mut scratch);
		self.commit(scratch, cursor, header);
		Ok(())
	}

	/// Appends one MoveTo/LineTo group holding at least two points.
	pub fn push_line<P: AsRef<[i64]>>(&mut self, points: &[P], kind: FeatureKind) -> Result<()> {
		self.check_arity(points)?;
		if points.len() < 2 {
			return Err(anyhow!(VectorTileError::InsufficientPoints {
				kind,
				required: 2,
				actual: points.len(),
			}));
		}
		self.sync_cursor()?;

		let mut cursor = self.cursor.clone();
		let mut scratch = Vec::with_capacity(points.len() * self.dimensions + 2);
		let line_to = self.stage_group(points, &mut cursor, &mut scratch);
		self.commit(scratch, cursor, line_to);
		Ok(())
	}

	/// Appends a closed ring; a trailing copy of the first point is not encoded.
	pub fn push_ring<P: AsRef<[i64]>>(&mut self, ring: &[P]) -> Result<()> {
		self.check_arity(ring)?;
		let ring = match ring {
			[first, .., last] if first.as_ref() == last.as_ref() => &ring[..ring.len() - 1],
			_ => ring,
		};
		if ring.len() < 3 {
			return Err(anyhow!(VectorTileError::InsufficientPoints {
				kind: FeatureKind::Polygon,
				required: 3,
				actual: ring.len(),
			}));
		}
		self.sync_cursor()?;

		let mut cursor = self.cursor.clone();
		let mut scratch = Vec::with_capacity(ring.len() * self.dimensions + 3);
		self.stage_group(ring, &mut cursor, &mut scratch);
		let close_path = self.data.len() + scratch.len();
		scratch.push(Command::ClosePath.encode(1));
		self.commit(scratch, cursor, close_path);
		Ok(())
	}

	/// Stages `MoveTo(1) p0 LineTo(n-1) p1..` and returns the final index of the LineTo header.
	fn stage_group<P: AsRef<[i64]>>(&self, points: &[P], cursor: &mut [i64], scratch: &mut Vec<u64>) -> usize {
		scratch.push(Command::MoveTo.encode(1));
		CommandStream::stage_points(&points[..1], cursor, scratch);
		let line_to = self.data.len() + scratch.len();
		scratch.push(Command::LineTo.encode(points.len() as u64 - 1));
		CommandStream::stage_points(&points[1..], cursor, scratch);
		line_to
	}

	/// Decodes a point stream made of one or more MoveTo commands.
	pub fn decode_points(&self) -> Result<Points> {
		let mut decoder = Decoder::new(&self.data, self.dimensions);
		let mut points = Vec::new();
		while decoder.has_remaining() {
			match decoder.command()? {
				(Command::MoveTo, count) => {
					for _ in 0..count {
						points.push(decoder.point()?);
					}
				}
				(command, _) => return Err(malformed(format!("unexpected {command:?} in a point geometry"))),
			}
		}
		Ok(points)
	}

	/// Decodes MoveTo/LineTo groups, optionally terminated by ClosePath.
	///
	/// Open groups with fewer than two points and closed rings with three or fewer points
	/// (closing point included) are dropped.
	pub fn decode_groups(&self, closed: bool) -> Result<Vec<Points>> {
		let mut decoder = Decoder::new(&self.data, self.dimensions);
		let mut groups = Vec::new();
		while decoder.has_remaining() {
			match decoder.command()? {
				(Command::MoveTo, 1) => {}
				(command, count) => {
					return Err(malformed(format!(
						"expected MoveTo with count 1 to start a group, found {command:?} with count {count}"
					)));
				}
			}
			let mut group = vec![decoder.point()?];

			if !decoder.has_remaining() {
				return Err(malformed("stream ends after MoveTo"));
			}
			match decoder.command()? {
				(Command::LineTo, count) => {
					for _ in 0..count {
						group.push(decoder.point()?);
					}
				}
				(command, _) => return Err(malformed(format!("expected LineTo after MoveTo, found {command:?}"))),
			}

			if closed {
				match decoder.command() {
					Ok((Command::ClosePath, 1)) => {}
					_ => return Err(malformed("ring is not terminated by ClosePath")),
				}
				group.push(group[0].clone());
				if group.len() <= 3 {
					trace!("dropping degenerate ring with {} points", group.len());
					continue;
				}
			} else if group.len() < 2 {
				trace!("dropping degenerate line with {} points", group.len());
				continue;
			}
			groups.push(group);
		}
		Ok(groups)
	}
}

struct Decoder<'a> {
	data: &'a [u64],
	position: usize,
	cursor: Vec<i64>,
}

impl<'a> Decoder<'a> {
	fn new(data: &'a [u64], dimensions: usize) -> Decoder<'a> {
		Decoder {
			data,
			position: 0,
			cursor: vec![0; dimensions],
		}
	}

	fn has_remaining(&self) -> bool {
		self.position < self.data.len()
	}

	fn read(&mut self) -> Option<u64> {
		let value = self.data.get(self.position).copied();
		self.position += 1;
		value
	}

	fn command(&mut self) -> Result<(Command, u64)> {
		let value = self.read().ok_or_else(|| malformed("expected a command"))?;
		Command::decode(value)
	}

	fn point(&mut self) -> Result<Coordinates> {
		for index in 0..self.cursor.len() {
			let delta = self
				.read()
				.ok_or_else(|| malformed("missing coordinate operand"))?;
			self.cursor[index] = self.cursor[index].wrapping_add(zigzag::decode(delta));
		}
		Ok(self.cursor.clone())
	}
}
