// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    plist::{Dictionary, Value},
    std::io::Write,
    tempfile::NamedTempFile,
};

pub const ABC_XML: &str = indoc::indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
    <plist version="1.0">
    <dict>
        <key>a</key>
        <string>one</string>
        <key>b</key>
        <integer>2</integer>
        <key>c</key>
        <dict>
            <key>d</key>
            <dict>
                <key>e</key>
                <false/>
            </dict>
        </dict>
    </dict>
    </plist>
"#};

/// BLAKE2b-512 of `one`, `2`, `False`.
pub const ABC_DIGEST: &str = "76378e151ec6eefd841b449231ec8f4c9281206b16135fae08b67286914233ef6d5a0e779f72f22bb60493363ba0cec0b9b97378103aa75d0e2e3a87757caee2";

pub const XYZ_XML: &str = indoc::indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
    <plist version="1.0">
    <dict>
        <key>x</key>
        <dict>
            <key>y</key>
            <true/>
        </dict>
        <key>z</key>
        <real>-10209.4324</real>
    </dict>
    </plist>
"#};

/// BLAKE2b-512 of `True`, `-10209.4324`.
pub const XYZ_DIGEST: &str = "36b7f2ee5de2ed77d359c1d2c0fc855f02bd22d2f47475e13d10455c228399df9999affbecd70454d37aee48d018549db581f0a8bfa91a789ae61d315366fb3b";

pub const LAUNCH_AGENT_XML: &str = indoc::indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
    <plist version="1.0">
    <dict>
        <key>Label</key>
        <string>com.example.agent</string>
        <key>ProgramArguments</key>
        <array>
            <string>/usr/local/bin/example-agent</string>
            <string>--daemon</string>
        </array>
        <key>RunAtLoad</key>
        <true/>
    </dict>
    </plist>
"#};

/// The nested dictionary `{"a": "one", "b": 2, "c": {"d": {"e": false}}}`.
pub fn abc_dictionary() -> Dictionary {
    let mut d = Dictionary::new();
    d.insert("e".into(), Value::Boolean(false));

    let mut c = Dictionary::new();
    c.insert("d".into(), Value::Dictionary(d));

    let mut root = Dictionary::new();
    root.insert("a".into(), Value::String("one".into()));
    root.insert("b".into(), Value::Integer(2.into()));
    root.insert("c".into(), Value::Dictionary(c));

    root
}

pub fn binary_plist(dict: &Dictionary) -> Vec<u8> {
    let mut data = vec![];
    Value::Dictionary(dict.clone())
        .to_writer_binary(&mut data)
        .unwrap();

    data
}

pub fn write_temp_plist(data: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".plist")
        .tempfile()
        .unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();

    file
}
