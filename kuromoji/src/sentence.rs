use crate::common::MAX_CATEGORIES;
use crate::dictionary::character::{CategorySet, CharacterDefinition};

/// Sentence-ending punctuation; each one closes a sentence.
const PUNCTUATION: [char; 2] = ['、', '。'];

/// Input text decomposed into code points with classification results.
#[derive(Default, Clone, Debug)]
pub struct Sentence {
    input: String,
    chars: Vec<char>,
    c2b: Vec<usize>,
    sets: Vec<CategorySet>,
    runs: Vec<Vec<usize>>,
}

impl Sentence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.chars.clear();
        self.c2b.clear();
        self.sets.clear();
        for run in &mut self.runs {
            run.clear();
        }
    }

    pub fn set_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.clear();
        self.input.push_str(input.as_ref());
    }

    pub fn compile(&mut self, char_def: &CharacterDefinition) {
        self.compute_basic();
        self.compute_categories(char_def);
        self.compute_groupable();
    }

    fn compute_basic(&mut self) {
        for (bi, ch) in self.input.char_indices() {
            self.chars.push(ch);
            self.c2b.push(bi);
        }
        self.c2b.push(self.input.len());
    }

    fn compute_categories(&mut self, char_def: &CharacterDefinition) {
        self.sets
            .extend(self.chars.iter().map(|&c| char_def.category_set(c)));
    }

    /// Fills, for every class occurring in the sentence, the length of the
    /// run of characters containing that class from each position.
    fn compute_groupable(&mut self) {
        let len = self.chars.len();
        let present = self
            .sets
            .iter()
            .fold(CategorySet::new(), |acc, &set| acc.union(set));
        self.runs.resize_with(MAX_CATEGORIES, Vec::new);
        for class_id in present.iter() {
            let run = &mut self.runs[usize::from(class_id)];
            run.resize(len + 1, 0);
            for i in (0..len).rev() {
                run[i] = if self.sets[i].contains(class_id) {
                    run[i + 1] + 1
                } else {
                    0
                };
            }
        }
    }

    #[inline(always)]
    pub fn raw(&self) -> &str {
        &self.input
    }

    #[inline(always)]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    #[inline(always)]
    pub fn len_char(&self) -> usize {
        self.chars.len()
    }

    #[inline(always)]
    pub fn byte_position(&self, pos_char: usize) -> usize {
        self.c2b[pos_char]
    }

    /// Number of consecutive characters from `pos_char` whose category set
    /// contains `class_id`.
    #[inline(always)]
    pub fn run_length(&self, pos_char: usize, class_id: u8) -> usize {
        self.runs
            .get(usize::from(class_id))
            .and_then(|run| run.get(pos_char))
            .copied()
            .unwrap_or(0)
    }
}

/// Splits `text` after every `、` and `。`, keeping the punctuation at the
/// end of its sentence.
///
/// Concatenating the pieces gives back `text`; an empty text yields no
/// pieces.
pub fn split_by_punctuation(text: &str) -> Vec<&str> {
    let mut sentences = vec![];
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if PUNCTUATION.contains(&c) {
            let end = i + c.len_utf8();
            sentences.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}
