//! Character classes and per-code-point classification defined in `char.def`.
/// Sets of character class ids.
pub mod category;

use std::io::Read;

use hashbrown::HashMap;
use regex::Regex;

use crate::buffer::ByteBuffer;
use crate::common::{CLASSIFIED_CODE_POINTS, DEFAULT_CATEGORY, MAX_CATEGORIES};
use crate::errors::{Diagnostic, KuromojiError, Result, skip_line};

pub use crate::dictionary::character::category::CategorySet;

const UNASSIGNED: u8 = u8::MAX;

/// `NAME INVOKE GROUP LENGTH`
const CLASS_LINE: &str = r"^([A-Za-z_]\w*)\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)$";

/// `CODE[..CODE] DEFAULT [COMPAT...]`
const MAPPING_LINE: &str =
    r"^(0[xX][0-9A-Fa-f]+|\d+)(?:\.\.(0[xX][0-9A-Fa-f]+|\d+))?((?:\s+\w+)+)$";

/// Character class defined in `char.def`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CharacterClass {
    class_id: u8,
    name: String,
    invoke: bool,
    group: bool,
    max_length: u32,
}

impl CharacterClass {
    /// Id of the class, also its bit position in a [`CategorySet`].
    #[inline(always)]
    pub const fn class_id(&self) -> u8 {
        self.class_id
    }

    /// Gets the class name.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether unknown words are generated even if a known word starts here.
    #[inline(always)]
    pub const fn always_invoke(&self) -> bool {
        self.invoke
    }

    /// Whether a run of characters of this class becomes one unknown word.
    #[inline(always)]
    pub const fn grouping(&self) -> bool {
        self.group
    }

    /// Maximum length of prefix unknown words; 0 generates none.
    #[inline(always)]
    pub const fn max_length(&self) -> u32 {
        self.max_length
    }
}

/// Registry of character classes. Ids are assigned in registration order.
#[derive(Default, Clone, Debug)]
pub struct CategoryRegistry {
    classes: Vec<CharacterClass>,
    ids: HashMap<String, u8>,
}

impl CategoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class, returning its id.
    ///
    /// # Errors
    ///
    /// [`KuromojiError`] is returned when the name is already registered or
    /// [`MAX_CATEGORIES`] classes exist.
    pub fn register(
        &mut self,
        name: &str,
        invoke: bool,
        group: bool,
        max_length: u32,
    ) -> Result<u8> {
        if self.ids.contains_key(name) {
            return Err(KuromojiError::invalid_argument(
                "name",
                format!("class {name} is already defined"),
            ));
        }
        if self.classes.len() >= MAX_CATEGORIES {
            return Err(KuromojiError::invalid_argument(
                "name",
                format!("the number of classes must be at most {MAX_CATEGORIES}"),
            ));
        }
        let class_id = u8::try_from(self.classes.len())?;
        self.classes.push(CharacterClass {
            class_id,
            name: name.to_string(),
            invoke,
            group,
            max_length,
        });
        self.ids.insert(name.to_string(), class_id);
        Ok(class_id)
    }

    /// Gets the id of the class named `name`.
    #[inline(always)]
    pub fn id(&self, name: &str) -> Option<u8> {
        self.ids.get(name).copied()
    }

    /// Gets the class of `class_id`.
    #[inline(always)]
    pub fn get(&self, class_id: u8) -> Option<&CharacterClass> {
        self.classes.get(usize::from(class_id))
    }

    /// Gets the number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Checks if there is no class.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterates over the classes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterClass> {
        self.classes.iter()
    }

    /// Serializes the registry as `u8 invoke, u8 group, i32 length, string name`
    /// per class, in id order.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = ByteBuffer::with_capacity(self.classes.len() * 16);
        for class in &self.classes {
            buffer.put_u8(u8::from(class.invoke));
            buffer.put_u8(u8::from(class.group));
            buffer.put_i32(i32::try_from(class.max_length)?);
            buffer.put_str(&class.name)?;
        }
        buffer.shrink();
        Ok(buffer.into_bytes())
    }

    /// Deserializes a registry.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut buffer = ByteBuffer::from_bytes(bytes);
        let mut registry = Self::new();
        while buffer.remaining() > 0 {
            let invoke = buffer.read_u8()? != 0;
            let group = buffer.read_u8()? != 0;
            let max_length = u32::try_from(buffer.read_i32()?)?;
            let name = buffer.read_str()?;
            registry.register(&name, invoke, group, max_length)?;
        }
        Ok(registry)
    }
}

/// Classifier mapping every code point to a default class and a set of
/// compatible classes.
#[derive(Clone, Debug, Default)]
pub struct CharacterDefinition {
    registry: CategoryRegistry,
    default_table: Vec<u8>,
    compat_table: Vec<u32>,
    default_id: Option<u8>,
}

impl CharacterDefinition {
    /// Creates a classifier from its serialized parts.
    ///
    /// # Errors
    ///
    /// [`KuromojiError`] is returned when a table does not cover
    /// [`CLASSIFIED_CODE_POINTS`] entries or `DEFAULT` is not registered.
    pub fn from_parts(
        registry: CategoryRegistry,
        default_table: Vec<u8>,
        compat_table: Vec<u32>,
    ) -> Result<Self> {
        if default_table.len() != CLASSIFIED_CODE_POINTS {
            return Err(KuromojiError::invalid_argument(
                "default_table",
                format!("the table must have {CLASSIFIED_CODE_POINTS} entries"),
            ));
        }
        if compat_table.len() != CLASSIFIED_CODE_POINTS {
            return Err(KuromojiError::invalid_argument(
                "compat_table",
                format!("the table must have {CLASSIFIED_CODE_POINTS} entries"),
            ));
        }
        let default_id = registry.id(DEFAULT_CATEGORY).ok_or_else(|| {
            KuromojiError::invalid_argument("registry", "DEFAULT class is not defined")
        })?;
        Ok(Self {
            registry,
            default_table,
            compat_table,
            default_id: Some(default_id),
        })
    }

    /// Gets the class registry.
    #[inline(always)]
    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Gets the default class id of every classified code point.
    #[inline(always)]
    pub fn default_table(&self) -> &[u8] {
        &self.default_table
    }

    /// Gets the compatible class set of every classified code point.
    #[inline(always)]
    pub fn compat_table(&self) -> &[u32] {
        &self.compat_table
    }

    /// Gets the `DEFAULT` class, or `None` for an empty classifier.
    pub fn default_class(&self) -> Option<&CharacterClass> {
        self.registry.get(self.default_id?)
    }

    #[inline(always)]
    fn class_id(&self, c: char) -> Option<u8> {
        self.default_table
            .get(c as usize)
            .copied()
            .filter(|&id| self.registry.get(id).is_some())
            .or(self.default_id)
    }

    /// Gets the default class of `c`.
    ///
    /// Code points above U+FFFF and unclassified code points resolve to
    /// `DEFAULT`. Returns `None` only for an empty classifier.
    #[inline(always)]
    pub fn lookup(&self, c: char) -> Option<&CharacterClass> {
        self.registry.get(self.class_id(c)?)
    }

    /// Gets the compatible classes of `c` in ascending id order, excluding
    /// its default class.
    pub fn lookup_compatible(&self, c: char) -> impl Iterator<Item = &CharacterClass> {
        let default_id = self.class_id(c);
        let compat = self
            .compat_table
            .get(c as usize)
            .map_or(CategorySet::new(), |&bits| CategorySet::from_bits(bits));
        compat
            .iter()
            .filter(move |&id| Some(id) != default_id)
            .filter_map(|id| self.registry.get(id))
    }

    /// Gets the default and compatible classes of `c` as a set.
    #[inline(always)]
    pub fn category_set(&self, c: char) -> CategorySet {
        let mut set = self
            .compat_table
            .get(c as usize)
            .map_or(CategorySet::new(), |&bits| CategorySet::from_bits(bits));
        if let Some(id) = self.class_id(c) {
            set.insert(id);
        }
        set
    }

    /// Creates a classifier from `char.def`.
    ///
    /// Malformed lines are skipped and recorded in `diagnostics`. A
    /// compatible class that is not defined is dropped silently.
    ///
    /// # Errors
    ///
    /// [`KuromojiError`] is returned when the input cannot be read or
    /// `DEFAULT` is not defined.
    pub fn from_reader<R>(mut rdr: R, diagnostics: &mut Vec<Diagnostic>) -> Result<Self>
    where
        R: Read,
    {
        const SOURCE: &str = "char.def";

        let class_line = Regex::new(CLASS_LINE)
            .map_err(|e| KuromojiError::invalid_state("invalid class pattern", e.to_string()))?;
        let mapping_line = Regex::new(MAPPING_LINE)
            .map_err(|e| KuromojiError::invalid_state("invalid mapping pattern", e.to_string()))?;

        let mut text = String::new();
        rdr.read_to_string(&mut text)?;

        let mut registry = CategoryRegistry::new();
        let mut mappings = vec![];

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = class_line.captures(line) {
                let flag = |s: &str| match s.parse::<i64>() {
                    Ok(0) => Some(false),
                    Ok(1) => Some(true),
                    _ => None,
                };
                let Some(invoke) = flag(&caps[2]) else {
                    skip_line(diagnostics, SOURCE, line_no, raw, "INVOKE must be 0 or 1");
                    continue;
                };
                let Some(group) = flag(&caps[3]) else {
                    skip_line(diagnostics, SOURCE, line_no, raw, "GROUP must be 0 or 1");
                    continue;
                };
                let Ok(max_length) = caps[4].parse::<u32>() else {
                    skip_line(diagnostics, SOURCE, line_no, raw, "LENGTH must be 0 or more");
                    continue;
                };
                if let Err(e) = registry.register(&caps[1], invoke, group, max_length) {
                    skip_line(diagnostics, SOURCE, line_no, raw, e.to_string());
                }
            } else if let Some(caps) = mapping_line.captures(line) {
                let Some(start) = parse_code_point(&caps[1]) else {
                    skip_line(diagnostics, SOURCE, line_no, raw, "CODE must be at most 0xFFFF");
                    continue;
                };
                let end = match caps.get(2) {
                    Some(m) => match parse_code_point(m.as_str()) {
                        Some(end) => end,
                        None => {
                            skip_line(diagnostics, SOURCE, line_no, raw, "CODE must be at most 0xFFFF");
                            continue;
                        }
                    },
                    None => start,
                };
                if start > end {
                    skip_line(diagnostics, SOURCE, line_no, raw, "range start exceeds its end");
                    continue;
                }
                let mut names = caps[3].split_whitespace().map(str::to_string);
                let Some(default) = names.next() else {
                    continue;
                };
                mappings.push(Mapping {
                    line_no,
                    text: raw,
                    start,
                    end,
                    default,
                    compatible: names.collect(),
                });
            } else {
                skip_line(diagnostics, SOURCE, line_no, raw, "unrecognized line");
            }
        }

        let mut default_table = vec![UNASSIGNED; CLASSIFIED_CODE_POINTS];
        let mut compat_table = vec![0u32; CLASSIFIED_CODE_POINTS];

        for mapping in &mappings {
            let Some(default_id) = registry.id(&mapping.default) else {
                skip_line(
                    diagnostics,
                    SOURCE,
                    mapping.line_no,
                    mapping.text,
                    format!("class {} is not defined", mapping.default),
                );
                continue;
            };
            let mut compat = CategorySet::new();
            for name in &mapping.compatible {
                if let Some(id) = registry.id(name) {
                    compat.insert(id);
                }
            }
            for cp in mapping.start..=mapping.end {
                default_table[cp] = default_id;
                compat_table[cp] |= compat.bits();
            }
        }

        let default_id = registry.id(DEFAULT_CATEGORY).ok_or_else(|| {
            KuromojiError::invalid_argument(SOURCE, "DEFAULT class is not defined")
        })?;
        for id in default_table.iter_mut().filter(|id| **id == UNASSIGNED) {
            *id = default_id;
        }

        Self::from_parts(registry, default_table, compat_table)
    }
}

struct Mapping<'a> {
    line_no: usize,
    text: &'a str,
    start: usize,
    end: usize,
    default: String,
    compatible: Vec<String>,
}

fn parse_code_point(s: &str) -> Option<usize> {
    let cp = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok()?,
        None => s.parse().ok()?,
    };
    (cp < CLASSIFIED_CODE_POINTS).then_some(cp)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAR_DEF: &str = include_str!("../tests/resources/char.def");

    fn build() -> CharacterDefinition {
        let mut diagnostics = vec![];
        let char_def = CharacterDefinition::from_reader(CHAR_DEF.as_bytes(), &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        char_def
    }

    fn name_of(char_def: &CharacterDefinition, c: char) -> &str {
        char_def.lookup(c).unwrap().name()
    }

    #[test]
    fn test_lookup() {
        let char_def = build();
        assert_eq!(name_of(&char_def, ' '), "SPACE");
        assert_eq!(name_of(&char_def, '日'), "KANJI");
        assert_eq!(name_of(&char_def, '!'), "SYMBOL");
        assert_eq!(name_of(&char_def, '1'), "NUMERIC");
        assert_eq!(name_of(&char_def, 'A'), "ALPHA");
        assert_eq!(name_of(&char_def, 'あ'), "HIRAGANA");
        assert_eq!(name_of(&char_def, 'ア'), "KATAKANA");
        assert_eq!(name_of(&char_def, '一'), "KANJINUMERIC");
        assert_eq!(name_of(&char_def, '𠮷'), "DEFAULT");
        assert_eq!(name_of(&char_def, '\u{0E01}'), "DEFAULT");
    }

    #[test]
    fn test_lookup_compatible() {
        let char_def = build();
        let names = |c| {
            char_def
                .lookup_compatible(c)
                .map(|class| class.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names('一'), vec!["KANJI"]);
        assert_eq!(names('\u{3007}'), vec!["KANJINUMERIC"]);
        assert_eq!(names('ー'), vec!["HIRAGANA"]);
        assert!(names('あ').is_empty());
        assert!(names('𠮷').is_empty());
    }

    #[test]
    fn test_class_definitions() {
        let char_def = build();
        let check = |c, invoke, group, length| {
            let class = char_def.lookup(c).unwrap();
            assert_eq!(class.always_invoke(), invoke, "{c}");
            assert_eq!(class.grouping(), group, "{c}");
            assert_eq!(class.max_length(), length, "{c}");
        };
        check(' ', false, true, 0);
        check('日', false, false, 2);
        check('!', true, true, 0);
        check('1', true, true, 0);
        check('A', true, true, 0);
        check('あ', false, true, 2);
        check('ア', true, true, 2);
        check('一', true, true, 0);
    }

    #[test]
    fn test_category_set() {
        let char_def = build();
        let registry = char_def.registry();
        let set = char_def.category_set('一');
        assert!(set.contains(registry.id("KANJINUMERIC").unwrap()));
        assert!(set.contains(registry.id("KANJI").unwrap()));
        assert!(!set.contains(registry.id("HIRAGANA").unwrap()));
    }

    #[test]
    fn test_registry_round_trip() {
        let char_def = build();
        let bytes = char_def.registry().to_bytes().unwrap();
        let registry = CategoryRegistry::from_bytes(bytes).unwrap();
        assert_eq!(registry.len(), char_def.registry().len());
        for (lhs, rhs) in registry.iter().zip(char_def.registry().iter()) {
            assert_eq!(lhs, rhs);
        }
        let default = registry.get(0).unwrap();
        assert_eq!(default.name(), "DEFAULT");
        assert!(!default.always_invoke());
        assert!(default.grouping());
        assert_eq!(default.max_length(), 0);
        let cyrillic = registry.get(10).unwrap();
        assert_eq!(cyrillic.name(), "CYRILLIC");
        assert!(cyrillic.always_invoke());
        assert!(cyrillic.grouping());
        assert_eq!(cyrillic.max_length(), 0);
    }

    #[test]
    fn test_malformed_lines() {
        let char_def = "DEFAULT 0 1 0
SPACE 2 1 0
ALPHA 1 3 0
KANJI 0 0 -1
0x0020 SPACE
0x0041..0x005A ALPHA
0x0061..0x0041 DEFAULT
0x10000 DEFAULT
0x0030 NUMERIC
invalid line here
0x0062 DEFAULT UNDEFINED";
        let mut diagnostics = vec![];
        let char_def = CharacterDefinition::from_reader(char_def.as_bytes(), &mut diagnostics).unwrap();
        let lines: Vec<_> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 7, 8, 10, 5, 6, 9]);
        assert_eq!(char_def.registry().len(), 1);
        assert_eq!(char_def.lookup(' ').unwrap().name(), "DEFAULT");
        assert_eq!(char_def.lookup_compatible('b').count(), 0);
    }

    #[test]
    fn test_undefined_default() {
        let mut diagnostics = vec![];
        let result = CharacterDefinition::from_reader("SPACE 0 1 0".as_bytes(), &mut diagnostics);
        assert!(result.is_err());
    }

    #[test]
    fn test_too_many_classes() {
        let mut text = String::from("DEFAULT 0 1 0\n");
        for i in 0..MAX_CATEGORIES {
            text.push_str(&format!("CLASS{i} 0 1 0\n"));
        }
        let mut diagnostics = vec![];
        let char_def = CharacterDefinition::from_reader(text.as_bytes(), &mut diagnostics).unwrap();
        assert_eq!(char_def.registry().len(), MAX_CATEGORIES);
        assert_eq!(diagnostics.len(), 1);
    }
}
