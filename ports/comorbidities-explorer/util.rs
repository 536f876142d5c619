/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

/// Break a display name into one word per line; runs of spaces collapse.
pub(crate) fn multiline_label(name: &str) -> String {
    name.split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Short label of a subgroup named `<disease>.<n>`: "Subgroup" over the
/// part after the first dot (the whole name when there is none).
pub(crate) fn subgroup_label(name: &str) -> String {
    let suffix = name.split_once('.').map_or(name, |(_, rest)| rest);
    format!("Subgroup\n{suffix}")
}
