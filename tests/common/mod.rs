//! Shared fixture: a small page with a list, a styled first item and a few
//! targets for content and visibility tests.

#![allow(dead_code)]

use littledom::Document;

pub const FIXTURE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>fixture</title>
<style>#listTest li:first-child { color: red }</style>
</head>
<body>
<h6>Heading</h6>
<ul id="listTest"><li>1</li><li>2</li><li>3</li><li class="last">4</li><div>nested</div></ul>
<div id="htmlTest">foo</div>
<div id="hideTest">hide me</div>
</body>
</html>"#;

pub fn fixture() -> Document {
    Document::parse(FIXTURE)
}
