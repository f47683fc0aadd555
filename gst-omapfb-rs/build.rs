// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Exports `COMMIT_ID` and `BUILD_REL_DATE` for `gst::plugin_define!`.

fn main() {
    gst_plugin_version_helper::info()
}
