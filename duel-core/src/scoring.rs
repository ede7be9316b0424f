use crate::code::CODE_LENGTH;

/// Result of evaluating one guess against a secret code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessScore {
    pub correct_positions: u32,
    pub misplaced: u32,
}

impl GuessScore {
    /// The game is won when every digit is in its exact position.
    pub fn is_winning(&self) -> bool {
        self.correct_positions as usize == CODE_LENGTH
    }

    pub fn message(&self) -> String {
        format!(
            "{} positions correct, {} misplaced",
            self.correct_positions, self.misplaced
        )
    }
}

pub struct ScoringEngine;

impl ScoringEngine {
    /// Evaluate a guess against the secret, digit by digit.
    ///
    /// First pass counts exact-position matches and consumes those digits
    /// on both sides. Second pass matches each remaining guess digit against
    /// the remaining secret digits with multiset semantics: every secret
    /// digit satisfies at most one misplaced match, so a guess of `4111`
    /// against `1123` scores 1 correct + 1 misplaced, not 1 + 2.
    pub fn evaluate_guess(guess: &[u8; CODE_LENGTH], secret: &[u8; CODE_LENGTH]) -> GuessScore {
        let mut correct_positions = 0u32;
        let mut guess_consumed = [false; CODE_LENGTH];
        let mut secret_consumed = [false; CODE_LENGTH];

        for i in 0..CODE_LENGTH {
            if guess[i] == secret[i] {
                correct_positions += 1;
                guess_consumed[i] = true;
                secret_consumed[i] = true;
            }
        }

        let mut misplaced = 0u32;
        for i in 0..CODE_LENGTH {
            if guess_consumed[i] {
                continue;
            }
            for j in 0..CODE_LENGTH {
                if !secret_consumed[j] && secret[j] == guess[i] {
                    misplaced += 1;
                    secret_consumed[j] = true;
                    break;
                }
            }
        }

        GuessScore {
            correct_positions,
            misplaced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::parse_code;

    fn score(guess: &str, secret: &str) -> GuessScore {
        ScoringEngine::evaluate_guess(&parse_code(guess).unwrap(), &parse_code(secret).unwrap())
    }

    #[test]
    fn test_exact_match_wins() {
        let s = score("5678", "5678");
        assert_eq!(s.correct_positions, 4);
        assert_eq!(s.misplaced, 0);
        assert!(s.is_winning());
    }

    #[test]
    fn test_swapped_pair() {
        // Secret 1234, guess 1243: positions 0,1 exact, 2,3 swapped.
        let s = score("1243", "1234");
        assert_eq!(s.correct_positions, 2);
        assert_eq!(s.misplaced, 2);
        assert!(!s.is_winning());
        assert_eq!(s.message(), "2 positions correct, 2 misplaced");
    }

    #[test]
    fn test_repeated_guess_digits_score_exact_matches() {
        // Secret 1123, guess 1111: positions 0 and 1 are both exact; the
        // two leftover '1's have no secret '1' left to pair with.
        let s = score("1111", "1123");
        assert_eq!(s.correct_positions, 2);
        assert_eq!(s.misplaced, 0);
    }

    #[test]
    fn test_repeated_digits_use_multiset_semantics() {
        // Secret 1123, guess 4111: one exact '1' at position 1, and only
        // one more '1' remains in the secret, so a single misplaced match,
        // not two.
        let s = score("4111", "1123");
        assert_eq!(s.correct_positions, 1);
        assert_eq!(s.misplaced, 1);
    }

    #[test]
    fn test_no_match() {
        let s = score("5678", "1234");
        assert_eq!(s.correct_positions, 0);
        assert_eq!(s.misplaced, 0);
        assert_eq!(s.message(), "0 positions correct, 0 misplaced");
    }

    #[test]
    fn test_all_misplaced() {
        let s = score("4321", "1234");
        assert_eq!(s.correct_positions, 0);
        assert_eq!(s.misplaced, 4);
    }

    #[test]
    fn test_exact_match_consumes_before_misplaced() {
        // Secret 1213, guess 2211: exact matches at positions 1 and 2
        // consume the secret's only '2' and one '1'. The leftover guess '2'
        // has no partner left; the leftover '1' matches the remaining '1'.
        let s = score("2211", "1213");
        assert_eq!(s.correct_positions, 2);
        assert_eq!(s.misplaced, 1);
    }

    #[test]
    fn test_duplicate_digits_in_secret() {
        let s = score("1122", "1221");
        assert_eq!(s.correct_positions, 2);
        assert_eq!(s.misplaced, 2);
    }
}
