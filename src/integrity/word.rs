use tracing::trace;

use super::{bch, Integrity};
use crate::BitBlock;

const INFO_LEN: usize = bch::INFO_BITS as usize;
const PARITY_LEN: usize = bch::PARITY_BITS as usize;
const CODEWORD_LEN: usize = bch::CODEWORD_BITS as usize;

/// A BCH protected word of `N` bits holding `K = N / 15` interleaved codewords.
///
/// The layout is all information segments followed by all parity segments:
/// `[info_1 .. info_K][parity_1 .. parity_K]`, each info segment 11 bits and each parity
/// segment 4 bits. Codeword `i` is `info_i` followed by `parity_i`.
///
/// Correction happens at construction; [ErrorCorrectedWord::bits] returns the block with the
/// original layout restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCorrectedWord<const N: usize> {
    bits: BitBlock<N>,
    corrected: usize,
}

impl<const N: usize> ErrorCorrectedWord<N> {
    /// Number of interleaved codewords.
    pub const CODEWORDS: usize = N / CODEWORD_LEN;

    const VALID_WIDTH: () = assert!(
        N > 0 && N % CODEWORD_LEN == 0,
        "word width must be a multiple of 15 bits"
    );

    /// Run BCH correction over every codeword in `block`.
    #[must_use]
    pub fn new(block: BitBlock<N>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_WIDTH;

        let mut bits = block;
        let mut corrected = 0;
        for idx in 0..Self::CODEWORDS {
            let (info_at, parity_at) = Self::offsets(idx);
            let codeword = Self::codeword(&block, idx);
            let (fixed, modified) = bch::correct(codeword);
            if modified {
                trace!(codeword = idx, from = codeword, to = fixed, "bch corrected");
                bits.insert(info_at, &BitBlock::<INFO_LEN>::from_u64(u64::from(fixed >> 4)));
                bits.insert(parity_at, &BitBlock::<PARITY_LEN>::from_u64(u64::from(fixed & 0xf)));
                corrected += 1;
            }
        }

        ErrorCorrectedWord { bits, corrected }
    }

    /// Recompute every parity segment of `block` from its information segment.
    #[must_use]
    pub fn with_parity(block: BitBlock<N>) -> BitBlock<N> {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_WIDTH;

        let mut bits = block;
        for idx in 0..Self::CODEWORDS {
            let (info_at, parity_at) = Self::offsets(idx);
            #[allow(clippy::cast_possible_truncation)]
            let info = block.slice::<INFO_LEN>(info_at).to_unsigned() as u16;
            let parity = bch::encode(info) & 0xf;
            bits.insert(parity_at, &BitBlock::<PARITY_LEN>::from_u64(u64::from(parity)));
        }
        bits
    }

    /// True if at least one codeword was corrected.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.corrected > 0
    }

    /// Number of codewords that were corrected.
    #[must_use]
    pub fn num_corrected(&self) -> usize {
        self.corrected
    }

    #[must_use]
    pub fn integrity(&self) -> Integrity {
        if self.is_modified() {
            Integrity::Corrected
        } else {
            Integrity::Ok
        }
    }

    /// The word, corrected where needed, in its original `[info..][parity..]` layout.
    #[must_use]
    pub fn bits(&self) -> BitBlock<N> {
        self.bits
    }

    // Bit offsets of the info and parity segments of codeword `idx`.
    fn offsets(idx: usize) -> (usize, usize) {
        (
            idx * INFO_LEN,
            Self::CODEWORDS * INFO_LEN + idx * PARITY_LEN,
        )
    }

    #[allow(clippy::cast_possible_truncation)]
    fn codeword(block: &BitBlock<N>, idx: usize) -> u16 {
        let (info_at, parity_at) = Self::offsets(idx);
        let info = block.slice::<INFO_LEN>(info_at).to_unsigned() as u16;
        let parity = block.slice::<PARITY_LEN>(parity_at).to_unsigned() as u16;
        (info << PARITY_LEN) | parity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use test_case::test_case;

    fn random_valid<const N: usize>() -> BitBlock<N> {
        let mut rng = rand::thread_rng();
        let mut block = BitBlock::<N>::zeroed();
        for idx in 0..N {
            block.set(idx, rng.gen());
        }
        ErrorCorrectedWord::<N>::with_parity(block)
    }

    fn check_valid_round_trip<const N: usize>() {
        for _ in 0..50 {
            let block = random_valid::<N>();
            let word = ErrorCorrectedWord::new(block);
            assert!(!word.is_modified());
            assert_eq!(word.integrity(), Integrity::Ok);
            assert_eq!(word.bits(), block);
        }
    }

    fn check_single_flip_per_codeword<const N: usize>() {
        let block = random_valid::<N>();
        for pos in 0..N {
            let mut damaged = block;
            damaged.set(pos, !block.get(pos));
            let word = ErrorCorrectedWord::new(damaged);
            assert!(word.is_modified(), "flip at {pos}");
            assert_eq!(word.num_corrected(), 1);
            assert_eq!(word.bits(), block, "flip at {pos}");
        }
    }

    #[test_case(15 ; "single codeword")]
    #[test_case(30 ; "two codewords")]
    #[test_case(90 ; "six codewords")]
    #[test_case(150 ; "ten codewords")]
    #[test_case(270 ; "eighteen codewords")]
    fn valid_words_are_unmodified(n: usize) {
        match n {
            15 => check_valid_round_trip::<15>(),
            30 => check_valid_round_trip::<30>(),
            90 => check_valid_round_trip::<90>(),
            150 => check_valid_round_trip::<150>(),
            270 => check_valid_round_trip::<270>(),
            _ => unreachable!(),
        }
    }

    #[test_case(15 ; "single codeword")]
    #[test_case(30 ; "two codewords")]
    #[test_case(90 ; "six codewords")]
    #[test_case(150 ; "ten codewords")]
    #[test_case(270 ; "eighteen codewords")]
    fn single_flips_are_corrected(n: usize) {
        match n {
            15 => check_single_flip_per_codeword::<15>(),
            30 => check_single_flip_per_codeword::<30>(),
            90 => check_single_flip_per_codeword::<90>(),
            150 => check_single_flip_per_codeword::<150>(),
            270 => check_single_flip_per_codeword::<270>(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn one_flip_in_each_codeword() {
        let block = random_valid::<90>();
        let mut damaged = block;
        // one info bit in codewords 0..3 and one parity bit in codewords 3..6
        for idx in 0..3 {
            let pos = idx * INFO_LEN + 5;
            damaged.set(pos, !damaged.get(pos));
        }
        for idx in 3..6 {
            let pos = 6 * INFO_LEN + idx * PARITY_LEN + 1;
            damaged.set(pos, !damaged.get(pos));
        }
        let word = ErrorCorrectedWord::new(damaged);
        assert_eq!(word.num_corrected(), 6);
        assert_eq!(word.bits(), block);
    }

    #[test]
    fn interleaved_layout() {
        // two codewords: info 0x7ff and 0, parity follows both info segments
        let mut block = BitBlock::<30>::zeroed();
        block.insert(0, &BitBlock::<11>::from_u64(0x7ff));
        let block = ErrorCorrectedWord::<30>::with_parity(block);
        let expected = u64::from(bch::encode(0x7ff) & 0xf);
        assert_eq!(block.slice::<4>(22).to_unsigned(), expected);
        assert_eq!(block.slice::<4>(26).to_unsigned(), 0);
        assert_eq!(block.slice::<11>(11).to_unsigned(), 0);
    }
}
