use pasat_core::Digit;
use rand::Rng;

/// Draws digits uniformly from 1-9 with a soft bias against repeats.
///
/// A candidate equal to the previous digit survives with probability
/// `allow_repeat`; one equal to the digit two back (an ABA pattern)
/// survives with probability `allow_aba`. After `max_attempts` rejections
/// the last candidate is returned regardless.
#[derive(Debug, Clone)]
pub struct DigitGenerator {
    pub allow_repeat: f64,
    pub allow_aba: f64,
    pub max_attempts: usize,
}

impl Default for DigitGenerator {
    fn default() -> Self {
        Self {
            allow_repeat: 0.05,
            allow_aba: 0.10,
            max_attempts: 20,
        }
    }
}

impl DigitGenerator {
    pub fn next<R: Rng>(&self, rng: &mut R, history: &[Digit]) -> Digit {
        let last = history.last().copied();
        let two_back = history.len().checked_sub(2).map(|i| history[i]);

        let mut candidate = random_digit(rng);
        let mut attempts = 1;
        while self.rejects(rng, candidate, last, two_back) && attempts < self.max_attempts {
            candidate = random_digit(rng);
            attempts += 1;
        }
        candidate
    }

    fn rejects<R: Rng>(
        &self,
        rng: &mut R,
        candidate: Digit,
        last: Option<Digit>,
        two_back: Option<Digit>,
    ) -> bool {
        if last == Some(candidate) && !rng.random_bool(self.allow_repeat) {
            return true;
        }
        two_back == Some(candidate) && !rng.random_bool(self.allow_aba)
    }
}

fn random_digit<R: Rng>(rng: &mut R) -> Digit {
    let value = rng.random_range(Digit::MIN..=Digit::MAX);
    Digit::new(value).unwrap_or_else(|| unreachable!("range is 1..=9"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn d(v: u8) -> Digit {
        Digit::new(v).unwrap()
    }

    #[test]
    fn immediate_repeats_are_rare() {
        let generator = DigitGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut history = vec![d(4)];
        let mut repeats = 0;
        for _ in 0..5000 {
            let next = generator.next(&mut rng, &history);
            if Some(&next) == history.last() {
                repeats += 1;
            }
            history.push(next);
        }
        // Unbiased draws would repeat about 1 in 9 times (~555).
        assert!(repeats < 150, "too many repeats: {repeats}");
        assert!(repeats > 0);
    }

    #[test]
    fn aba_patterns_are_suppressed() {
        let generator = DigitGenerator::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut aba = 0;
        for _ in 0..3000 {
            let next = generator.next(&mut rng, &[d(2), d(6)]);
            if next == d(2) {
                aba += 1;
            }
        }
        assert!(aba < 120, "too many ABA patterns: {aba}");
    }

    #[test]
    fn never_fails_when_every_candidate_is_rejected() {
        let generator = DigitGenerator {
            allow_repeat: 0.0,
            allow_aba: 0.0,
            max_attempts: 20,
        };
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let digit = generator.next(&mut rng, &[d(1), d(1)]);
            assert!((1..=9).contains(&digit.value()));
        }
    }

    #[test]
    fn covers_every_digit() {
        let generator = DigitGenerator::default();
        let mut rng = StdRng::seed_from_u64(99);
        let mut seen = [false; 10];
        let mut history = Vec::new();
        for _ in 0..500 {
            let digit = generator.next(&mut rng, &history);
            seen[digit.value() as usize] = true;
            history.push(digit);
        }
        assert!(seen[1..].iter().all(|s| *s));
    }
}
