//! NNUE network structure and evaluation.
//!
//! Architecture: (768 -> 1024) x 2 perspectives -> 8 output buckets -> 1.
//! The bucket is chosen by total piece count, so the output layer can
//! specialize for opening/middlegame/endgame material without a separate
//! network per phase.

use super::simd;
use super::{QA, QB, SCALE};
use crate::board::error::NnueError;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Exact on-disk layout size in bytes: feature weights, feature bias, output
/// weights, output bias, all little-endian `i16`.
const EXPECTED_FILE_SIZE: usize =
    (INPUT_SIZE * HIDDEN_SIZE + HIDDEN_SIZE + NUM_BUCKETS * OUTPUT_WIDTH + NUM_BUCKETS) * 2;

/// Input feature size: 64 squares x 6 piece types x 2 colors.
pub const INPUT_SIZE: usize = 768;

/// Hidden layer size (must match trained network).
pub const HIDDEN_SIZE: usize = 1024;

/// Number of output buckets, selected by total piece count on the board.
pub const NUM_BUCKETS: usize = 8;

/// Width of the output layer's input: both perspectives concatenated.
const OUTPUT_WIDTH: usize = 2 * HIDDEN_SIZE;

/// Which output bucket to use for a position with `piece_count` pieces on the
/// board (2..=32).
#[inline]
#[must_use]
pub fn output_bucket(piece_count: u32) -> usize {
    let idx = (piece_count.saturating_sub(2)) / 4;
    (idx as usize).min(NUM_BUCKETS - 1)
}

/// NNUE accumulator storing hidden layer activations for both perspectives.
#[derive(Clone)]
pub struct NnueAccumulator {
    /// White's perspective accumulator.
    pub white: [i16; HIDDEN_SIZE],
    /// Black's perspective accumulator.
    pub black: [i16; HIDDEN_SIZE],
}

impl Default for NnueAccumulator {
    fn default() -> Self {
        Self {
            white: [0; HIDDEN_SIZE],
            black: [0; HIDDEN_SIZE],
        }
    }
}

impl NnueAccumulator {
    /// Create a new accumulator initialized with biases.
    #[must_use]
    pub fn new(biases: &[i16; HIDDEN_SIZE]) -> Self {
        Self {
            white: *biases,
            black: *biases,
        }
    }

    /// Refresh accumulator from scratch given active features.
    pub fn refresh(
        &mut self,
        white_features: &[usize],
        black_features: &[usize],
        network: &NnueNetwork,
    ) {
        self.white = network.feature_bias;
        self.black = network.feature_bias;
        for &feat in white_features {
            simd::add_weights(&mut self.white, &network.feature_weights[feat]);
        }
        for &feat in black_features {
            simd::add_weights(&mut self.black, &network.feature_weights[feat]);
        }
    }

    /// Add a single feature (piece placed on square) to both perspectives.
    #[inline]
    pub fn add_feature(&mut self, white_feat: usize, black_feat: usize, network: &NnueNetwork) {
        simd::add_weights(&mut self.white, &network.feature_weights[white_feat]);
        simd::add_weights(&mut self.black, &network.feature_weights[black_feat]);
    }

    /// Remove a single feature (piece removed from square) from both
    /// perspectives.
    #[inline]
    pub fn sub_feature(&mut self, white_feat: usize, black_feat: usize, network: &NnueNetwork) {
        simd::sub_weights(&mut self.white, &network.feature_weights[white_feat]);
        simd::sub_weights(&mut self.black, &network.feature_weights[black_feat]);
    }

    /// Quiet move or promotion without capture: one add, one sub.
    pub fn apply_add_sub(&mut self, add: (usize, usize), sub: (usize, usize), network: &NnueNetwork) {
        self.add_feature(add.0, add.1, network);
        self.sub_feature(sub.0, sub.1, network);
    }

    /// A capturing move (including promotion-captures): one add, two subs —
    /// the moved piece's origin and the captured piece.
    pub fn apply_add_sub_sub(
        &mut self,
        add: (usize, usize),
        sub1: (usize, usize),
        sub2: (usize, usize),
        network: &NnueNetwork,
    ) {
        self.add_feature(add.0, add.1, network);
        self.sub_feature(sub1.0, sub1.1, network);
        self.sub_feature(sub2.0, sub2.1, network);
    }

    /// An en-passant capture: one add, two subs (the mover's origin and the
    /// captured pawn, which is not on the destination square).
    pub fn apply_en_passant(
        &mut self,
        add: (usize, usize),
        sub_from: (usize, usize),
        sub_captured: (usize, usize),
        network: &NnueNetwork,
    ) {
        self.apply_add_sub_sub(add, sub_from, sub_captured, network);
    }

    /// Castling: the king and the rook both move, so two adds and two subs.
    pub fn apply_add_add_sub_sub(
        &mut self,
        add1: (usize, usize),
        add2: (usize, usize),
        sub1: (usize, usize),
        sub2: (usize, usize),
        network: &NnueNetwork,
    ) {
        self.add_feature(add1.0, add1.1, network);
        self.add_feature(add2.0, add2.1, network);
        self.sub_feature(sub1.0, sub1.1, network);
        self.sub_feature(sub2.0, sub2.1, network);
    }
}

/// NNUE network weights.
pub struct NnueNetwork {
    /// Feature transformer weights `[INPUT_SIZE][HIDDEN_SIZE]`.
    pub feature_weights: Box<[[i16; HIDDEN_SIZE]; INPUT_SIZE]>,
    /// Feature transformer biases `[HIDDEN_SIZE]`.
    pub feature_bias: [i16; HIDDEN_SIZE],
    /// Output weights per bucket, `us` and `them` perspectives concatenated.
    pub output_weights: Box<[[i16; OUTPUT_WIDTH]; NUM_BUCKETS]>,
    /// Output bias per bucket.
    pub output_bias: [i16; NUM_BUCKETS],
}

fn read_i16<R: Read>(reader: &mut R) -> Result<i16, NnueError> {
    let mut buf = [0u8; 2];
    reader
        .read_exact(&mut buf)
        .map_err(|e| NnueError::Io { message: e.to_string() })?;
    Ok(i16::from_le_bytes(buf))
}

fn read_from<R: Read>(reader: &mut R) -> Result<NnueNetwork, NnueError> {
    let mut feature_weights = Box::new([[0i16; HIDDEN_SIZE]; INPUT_SIZE]);
    for row in feature_weights.iter_mut() {
        for w in row.iter_mut() {
            *w = read_i16(reader)?;
        }
    }

    let mut feature_bias = [0i16; HIDDEN_SIZE];
    for b in &mut feature_bias {
        *b = read_i16(reader)?;
    }

    let mut output_weights = Box::new([[0i16; OUTPUT_WIDTH]; NUM_BUCKETS]);
    for bucket in output_weights.iter_mut() {
        for w in bucket.iter_mut() {
            *w = read_i16(reader)?;
        }
    }

    let mut output_bias = [0i16; NUM_BUCKETS];
    for b in &mut output_bias {
        *b = read_i16(reader)?;
    }

    Ok(NnueNetwork {
        feature_weights,
        feature_bias,
        output_weights,
        output_bias,
    })
}

impl NnueNetwork {
    /// Load network from a `.nnue` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NnueError> {
        let path = path.as_ref();
        let result = (|| {
            let file = File::open(path).map_err(|e| NnueError::Io { message: e.to_string() })?;
            let metadata = file
                .metadata()
                .map_err(|e| NnueError::Io { message: e.to_string() })?;
            let found = metadata.len() as usize;
            if found != EXPECTED_FILE_SIZE {
                return Err(NnueError::SizeMismatch {
                    expected: EXPECTED_FILE_SIZE,
                    found,
                });
            }
            read_from(&mut BufReader::new(file))
        })();
        #[cfg(feature = "logging")]
        match &result {
            Ok(_) => log::debug!("loaded NNUE network from {}", path.display()),
            Err(e) => log::warn!("failed to load NNUE network from {}: {e}", path.display()),
        }
        result
    }

    /// Evaluate position given accumulator, side to move, and the output
    /// bucket chosen by the caller (from total piece count). Returns a
    /// centipawn score from the side-to-move's perspective.
    #[inline]
    #[must_use]
    pub fn evaluate(&self, acc: &NnueAccumulator, white_to_move: bool, bucket: usize) -> i32 {
        let (us_acc, them_acc) = if white_to_move {
            (&acc.white, &acc.black)
        } else {
            (&acc.black, &acc.white)
        };

        let weights = &self.output_weights[bucket];
        let (us_weights, them_weights) = weights.split_at(HIDDEN_SIZE);
        let us_weights: &[i16; HIDDEN_SIZE] = us_weights.try_into().expect("hidden-sized half");
        let them_weights: &[i16; HIDDEN_SIZE] = them_weights.try_into().expect("hidden-sized half");

        let us_output = simd::clipped_relu_dot(us_acc, us_weights);
        let them_output = simd::clipped_relu_dot(them_acc, them_weights);

        let output = us_output + them_output + i64::from(self.output_bias[bucket]) * i64::from(QA);
        (output * i64::from(SCALE) / (i64::from(QA) * i64::from(QB))) as i32
    }
}

/// Compute feature index for a piece at a square from a perspective.
/// `piece_type` is the 0-based `PieceType::index()`, not the 1-based `id()`.
#[inline]
#[must_use]
pub fn feature_index(piece_type: usize, piece_color: usize, square: usize, perspective: usize) -> usize {
    let (oriented_sq, oriented_color) = if perspective == 1 {
        (square ^ 56, 1 - piece_color)
    } else {
        (square, piece_color)
    };
    oriented_color * 384 + piece_type * 64 + oriented_sq
}

/// Embedded default network (compiled into the binary).
#[cfg(feature = "embedded_nnue")]
pub static EMBEDDED_NETWORK: &[u8] = include_bytes!("nets/default.nnue");

#[cfg(feature = "embedded_nnue")]
impl NnueNetwork {
    /// Load network from embedded bytes.
    #[must_use]
    pub fn from_embedded() -> Self {
        Self::from_bytes(EMBEDDED_NETWORK).expect("embedded NNUE is invalid")
    }

    /// Load network from a byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self, NnueError> {
        if data.len() != EXPECTED_FILE_SIZE {
            return Err(NnueError::SizeMismatch {
                expected: EXPECTED_FILE_SIZE,
                found: data.len(),
            });
        }
        let mut cursor = std::io::Cursor::new(data);
        read_from(&mut cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_bucket_covers_full_piece_range() {
        assert_eq!(output_bucket(2), 0);
        assert_eq!(output_bucket(32), NUM_BUCKETS - 1);
        assert!(output_bucket(17) < NUM_BUCKETS);
    }

    #[test]
    fn feature_index_flips_for_black_perspective() {
        let white_view = feature_index(0, 0, 8, 0);
        let black_view = feature_index(0, 0, 8, 1);
        assert_ne!(white_view, black_view);
    }

    #[cfg(feature = "embedded_nnue")]
    #[test]
    fn from_bytes_rejects_the_wrong_size() {
        let too_short = vec![0u8; 10];
        match NnueNetwork::from_bytes(&too_short) {
            Err(NnueError::SizeMismatch { expected, found }) => {
                assert_eq!(expected, EXPECTED_FILE_SIZE);
                assert_eq!(found, 10);
            }
            Err(other) => panic!("expected SizeMismatch, got {other:?}"),
            Ok(_) => panic!("expected SizeMismatch, got Ok"),
        }
    }

    #[cfg(feature = "embedded_nnue")]
    #[test]
    fn embedded_network_is_exactly_one_layout_worth_of_bytes() {
        assert_eq!(EMBEDDED_NETWORK.len(), EXPECTED_FILE_SIZE);
    }
}
