//! Low-level markup helpers shared by the feed and page strategies.
//!
//! These are deliberately naive: they locate `<tag ...>...</tag>` blocks by
//! case-insensitive substring search and do not build a tree. Nested blocks of
//! the same tag are not supported; the first closing tag ends the block.

/// A located element: the opening tag text and everything up to its closing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    pub open_tag: &'a str,
    pub inner: &'a str,
}

/// A document with its ASCII-lowercased twin, so repeated searches share one copy.
///
/// ASCII lowercasing keeps byte offsets identical, so positions found in
/// `lower` index straight into `src`.
pub struct Markup<'a> {
    src: &'a str,
    lower: String,
}

impl<'a> Markup<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            lower: src.to_ascii_lowercase(),
        }
    }

    /// Every `<tag ...>...</tag>` block in document order.
    pub fn elements(&self, tag: &str) -> Vec<Element<'a>> {
        let mut out = Vec::new();
        let mut pos = 0usize;
        while let Some((el, end)) = self.next_element(tag, pos) {
            out.push(el);
            pos = end;
        }
        out
    }

    /// First `<tag ...>...</tag>` block.
    pub fn first(&self, tag: &str) -> Option<Element<'a>> {
        self.next_element(tag, 0).map(|(el, _)| el)
    }

    fn next_element(&self, tag: &str, from: usize) -> Option<(Element<'a>, usize)> {
        let tag_lc = tag.to_ascii_lowercase();
        let close = format!("</{}", tag_lc);
        let mut search = from;
        loop {
            let start = find_open_tag(&self.lower, &tag_lc, search)?;
            let open_end = self.src[start..].find('>')? + start + 1;
            let open_tag = &self.src[start..open_end];
            if open_tag.ends_with("/>") {
                // Self-closing; nothing inside to extract.
                search = open_end;
                continue;
            }
            let close_rel = self.lower[open_end..].find(&close)?;
            let inner_end = open_end + close_rel;
            let block_end = self.src[inner_end..]
                .find('>')
                .map(|i| inner_end + i + 1)
                .unwrap_or(self.src.len());
            let el = Element {
                open_tag,
                inner: &self.src[open_end..inner_end],
            };
            return Some((el, block_end));
        }
    }
}

/// Position of the next `<tag` that is a whole tag name (so `<a` does not match `<abbr`).
fn find_open_tag(lower: &str, tag_lc: &str, from: usize) -> Option<usize> {
    let needle = format!("<{}", tag_lc);
    let mut pos = from;
    loop {
        let idx = lower.get(pos..)?.find(&needle)? + pos;
        let after = idx + needle.len();
        match lower.as_bytes().get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(idx),
            None => return None,
            _ => pos = after,
        }
    }
}

impl<'a> Element<'a> {
    /// Value of an attribute on the opening tag, entity-decoded.
    /// Handles double, single and unquoted values.
    pub fn attr(&self, name: &str) -> Option<String> {
        attributes(self.open_tag)
            .into_iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| decode_entities(v))
    }

    /// Whether the `class` attribute contains `class` as one of its tokens.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|v| v.split_whitespace().any(|c| c.eq_ignore_ascii_case(class)))
            .unwrap_or(false)
    }

    /// Visible text: CDATA unwrapped, tags stripped, entities decoded, whitespace collapsed.
    pub fn text(&self) -> String {
        clean_text(self.inner)
    }

    /// First descendant block with the given tag.
    pub fn child(&self, tag: &str) -> Option<Element<'a>> {
        Markup::new(self.inner).first(tag)
    }

    /// All descendant blocks with the given tag.
    pub fn children(&self, tag: &str) -> Vec<Element<'a>> {
        Markup::new(self.inner).elements(tag)
    }
}

/// `name=value` pairs of an opening tag, in order. Quoted values are skipped
/// over whole, so an attribute name inside another value never matches.
/// Unquoted values run to whitespace; a `/` only ends one right before `>`.
fn attributes(open_tag: &str) -> Vec<(&str, &str)> {
    let body = open_tag.strip_prefix('<').unwrap_or(open_tag);
    let body = body.strip_suffix('>').unwrap_or(body);
    let body = body.strip_suffix('/').unwrap_or(body);

    // Skip the tag name.
    let mut rest = body.trim_start_matches(|c: char| !c.is_whitespace());
    let mut out = Vec::new();
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            break;
        }
        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        let after = rest[name_end..].trim_start();

        let Some(raw) = after.strip_prefix('=') else {
            out.push((name, ""));
            rest = after;
            continue;
        };
        let raw = raw.trim_start();
        let (value, tail) = match raw.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let quoted = &raw[1..];
                match quoted.find(q) {
                    Some(end) => (&quoted[..end], &quoted[end + 1..]),
                    None => (quoted, ""),
                }
            }
            _ => {
                let end = raw.find(char::is_whitespace).unwrap_or(raw.len());
                (&raw[..end], &raw[end..])
            }
        };
        out.push((name, value));
        rest = tail;
    }
    out
}

/// CDATA unwrapped, tags stripped, entities decoded, whitespace collapsed.
pub fn clean_text(s: &str) -> String {
    let unwrapped = unwrap_cdata(s);
    normalize_ws(&decode_entities(&strip_tags(&unwrapped)))
}

/// Replace every `<![CDATA[...]]>` section with its contents.
pub fn unwrap_cdata(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("<![CDATA[") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 9..];
        match body.find("]]>") {
            Some(end) => {
                out.push_str(&body[..end]);
                rest = &body[end + 3..];
            }
            None => {
                out.push_str(body);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Remove all tags `<...>` from the string.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Decode the named entities that show up in headlines plus numeric references.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let name = &tail[1..semi];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => name.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Collapse sequences of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// First absolute http(s) URL in raw text, ending at whitespace, a quote or `<`.
pub fn find_url(s: &str) -> Option<&str> {
    let start = s.find("https://").or_else(|| s.find("http://"))?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| c.is_whitespace() || matches!(c, '<' | '"' | '\'' | ']'))
        .unwrap_or(rest.len());
    Some(&rest[..end])
}
