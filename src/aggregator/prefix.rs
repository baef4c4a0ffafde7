//! Function name prefix classification.
//!
//! Groups routines by their leading CamelCase word(s): the name is cut right
//! before its second change of letter case. `KiFastCallEntry` and
//! `KiSystemService` both land in `Ki`, `RtlAllocateHeap` in `Rtl`.
//!
//! The scan starts in the upper-case state, so a name beginning with a
//! lower-case letter has already used its first change. Characters that are
//! neither upper- nor lower-case (digits, `_`, `@`, caseless scripts) never
//! count as a change and simply continue the current run.

/// Leading prefix of `name` up to its second case change
///
/// Returns `name` unchanged when it changes case fewer than two times.
pub fn function_name_prefix(name: &str) -> &str {
    let mut switches = 0;
    let mut upper = true;

    for (index, ch) in name.char_indices() {
        let is_upper = if ch.is_uppercase() {
            true
        } else if ch.is_lowercase() {
            false
        } else {
            continue;
        };

        if is_upper != upper {
            switches += 1;
            if switches == 2 {
                return &name[..index];
            }
            upper = is_upper;
        }
    }

    name
}
