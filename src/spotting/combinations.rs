use super::candidates::CandidateSet;

/// Product of the set sizes: the number of raw tuples before ordering is
/// enforced. Saturates instead of overflowing.
pub fn combination_count(sets: &[CandidateSet]) -> u128 {
    sets.iter()
        .fold(1u128, |acc, set| acc.saturating_mul(set.len() as u128))
}

struct Frame {
    position: usize,
    tuple: Vec<usize>,
}

/// Depth-first enumeration of strictly increasing row tuples, one row per
/// candidate set, on an explicit stack. Tuples come out in ascending
/// lexicographic order.
pub struct Combinations<'a> {
    sets: &'a [CandidateSet],
    stack: Vec<Frame>,
}

impl<'a> Combinations<'a> {
    pub fn new(sets: &'a [CandidateSet]) -> Self {
        let stack = if sets.is_empty() {
            Vec::new()
        } else {
            vec![Frame {
                position: 0,
                tuple: Vec::with_capacity(sets.len()),
            }]
        };
        Self { sets, stack }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            if frame.position == self.sets.len() {
                return Some(frame.tuple);
            }
            let floor = frame.tuple.last().copied();
            // Reverse push so the smallest row is popped first.
            for &row in self.sets[frame.position].rows.iter().rev() {
                if floor.is_some_and(|last| row <= last) {
                    continue;
                }
                let mut tuple = frame.tuple.clone();
                tuple.push(row);
                self.stack.push(Frame {
                    position: frame.position + 1,
                    tuple,
                });
            }
        }
        None
    }
}
