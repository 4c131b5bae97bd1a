use alloc::vec::Vec;

use crate::value::{Array, Id, Slice};

/// What post-processing does with one archived array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArrayFate {
    /// Rewrite `slice_id` as a slice of `array_id`.
    Slice {
        slice: Slice,
        slice_id: Id,
        array_id: Id,
    },
    /// The array owns its storage.
    Owner(Id),
}

/// Decides, for every array, whether it is a slice of another one.
///
/// An array is a slice of a container that holds its whole range and is
/// either longer, or equally long but archived earlier. Among several
/// candidates the outermost one wins (longest, then earliest), so the
/// chosen owner is never a slice itself and no two arrays point at each
/// other.
pub(crate) fn plan(arrays: &[(Id, Array)]) -> Vec<ArrayFate> {
    arrays
        .iter()
        .map(|&(id, array)| {
            let owner = arrays
                .iter()
                .filter(|&&(other_id, other)| {
                    other_id != id
                        && array.is_slice_of(&other)
                        && (other.length > array.length || other_id < id)
                })
                .max_by(|(a_id, a), (b_id, b)| a.length.cmp(&b.length).then(b_id.cmp(a_id)));

            match owner {
                Some(&(owner_id, owner)) => {
                    log::trace!("array {id} is a slice of array {owner_id}");
                    ArrayFate::Slice {
                        slice: Slice {
                            length: array.length,
                            offset: array.offset_in(&owner),
                            id: Some(owner_id),
                        },
                        slice_id: id,
                        array_id: owner_id,
                    }
                }
                None => ArrayFate::Owner(id),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::{ArrayFate, plan};
    use crate::value::{Array, Slice};

    #[test]
    fn outermost_container_wins() {
        let data = vec![0_u16; 16];
        let arrays = [
            (4, Array::of(&data[2..6])),
            (9, Array::of(&data[..])),
            (12, Array::of(&data[0..8])),
        ];

        let fates = plan(&arrays);
        assert_eq!(
            fates[0],
            ArrayFate::Slice {
                slice: Slice {
                    length: 4,
                    offset: 2,
                    id: Some(9)
                },
                slice_id: 4,
                array_id: 9,
            }
        );
        assert_eq!(fates[1], ArrayFate::Owner(9));
        assert!(matches!(fates[2], ArrayFate::Slice { array_id: 9, .. }));
    }

    #[test]
    fn identical_ranges_point_at_the_first() {
        let data = vec![1_i64, 2, 3];
        let arrays = [(1, Array::of(&data[..])), (5, Array::of(&data[..]))];

        let fates = plan(&arrays);
        assert_eq!(fates[0], ArrayFate::Owner(1));
        assert!(matches!(
            fates[1],
            ArrayFate::Slice {
                slice: Slice { offset: 0, .. },
                array_id: 1,
                ..
            }
        ));
    }

    #[test]
    fn disjoint_and_overlapping_arrays_stay_owners() {
        let data = vec![0_u8; 10];
        let arrays = [(0, Array::of(&data[0..6])), (3, Array::of(&data[4..10]))];

        assert_eq!(
            plan(&arrays),
            vec![ArrayFate::Owner(0), ArrayFate::Owner(3)]
        );
    }
}
