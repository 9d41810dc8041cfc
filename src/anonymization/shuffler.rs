//! Decorrelating column shuffle
//!
//! Every column of a table is permuted independently, which severs the link
//! between the values of one record while keeping each column's own
//! distribution. The permutation is a privacy control, so it is drawn from the
//! operating system's CSPRNG rather than a seeded generator.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;

/// Returns the same multiset of values in a fresh random order
pub fn shuffle_column<T>(mut values: Vec<T>) -> Vec<T> {
    values.shuffle(&mut OsRng);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffle_is_permutation() {
        let input = vec![1, 3, 1, 5, 3, 7, 3, 5, 6, 5];
        let mut output = shuffle_column(input.clone());
        assert_eq!(output.len(), input.len());

        let mut sorted_input = input.clone();
        sorted_input.sort_unstable();
        output.sort_unstable();
        assert_eq!(output, sorted_input);
    }

    #[test]
    fn test_shuffle_changes_order() {
        let input: Vec<u32> = (0..64).collect();
        let output = shuffle_column(input.clone());
        // 1/64! chance of a false failure
        assert_ne!(output, input);
    }

    #[test]
    fn test_repeated_shuffles_differ() {
        let input: Vec<u32> = (0..64).collect();
        let first = shuffle_column(input.clone());
        let second = shuffle_column(input);
        assert_ne!(first, second);
    }

    #[test]
    fn test_shuffle_empty_and_single() {
        assert!(shuffle_column(Vec::<u8>::new()).is_empty());
        assert_eq!(shuffle_column(vec![9]), vec![9]);
    }
}
