//! HTML element kinds and the nesting rules behind implicit end tags.

macro_rules! tag_kinds {
    (
        void: [$($void:ident => $void_name:literal),* $(,)?],
        other: [$($kind:ident => $name:literal),* $(,)?] $(,)?
    ) => {
        /// Known HTML elements. Void elements come first.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum TagKind {
            $($void,)*
            $($kind,)*
            /// Any other element; the name is kept on the [`Tag`].
            Custom,
            /// Placeholder for tags dropped from a truncated scanner state.
            Unknown,
        }

        impl TagKind {
            const ALL: &'static [TagKind] = &[
                $(TagKind::$void,)*
                $(TagKind::$kind,)*
                TagKind::Custom,
                TagKind::Unknown,
            ];

            const VOID: &'static [TagKind] = &[$(TagKind::$void),*];

            /// Kind for an upper-cased element name.
            pub fn from_name(name: &str) -> TagKind {
                match name {
                    $($void_name => TagKind::$void,)*
                    $($name => TagKind::$kind,)*
                    _ => TagKind::Custom,
                }
            }
        }
    };
}

tag_kinds! {
    void: [
        Area => "AREA", Base => "BASE", Basefont => "BASEFONT", Bgsound => "BGSOUND",
        Br => "BR", Col => "COL", Command => "COMMAND", Embed => "EMBED", Frame => "FRAME",
        Hr => "HR", Image => "IMAGE", Img => "IMG", Input => "INPUT", Isindex => "ISINDEX",
        Keygen => "KEYGEN", Link => "LINK", Menuitem => "MENUITEM", Meta => "META",
        Nextid => "NEXTID", Param => "PARAM", Source => "SOURCE", Track => "TRACK", Wbr => "WBR",
    ],
    other: [
        A => "A", Abbr => "ABBR", Address => "ADDRESS", Article => "ARTICLE", Aside => "ASIDE",
        Audio => "AUDIO", B => "B", Bdi => "BDI", Bdo => "BDO", Blockquote => "BLOCKQUOTE",
        Body => "BODY", Button => "BUTTON", Canvas => "CANVAS", Caption => "CAPTION",
        Cite => "CITE", Code => "CODE", Colgroup => "COLGROUP", Data => "DATA",
        Datalist => "DATALIST", Dd => "DD", Del => "DEL", Details => "DETAILS", Dfn => "DFN",
        Dialog => "DIALOG", Div => "DIV", Dl => "DL", Dt => "DT", Em => "EM",
        Fieldset => "FIELDSET", Figcaption => "FIGCAPTION", Figure => "FIGURE",
        Footer => "FOOTER", Form => "FORM", H1 => "H1", H2 => "H2", H3 => "H3", H4 => "H4",
        H5 => "H5", H6 => "H6", Head => "HEAD", Header => "HEADER", Hgroup => "HGROUP",
        Html => "HTML", I => "I", Iframe => "IFRAME", Ins => "INS", Kbd => "KBD",
        Label => "LABEL", Legend => "LEGEND", Li => "LI", Main => "MAIN", Map => "MAP",
        Mark => "MARK", Math => "MATH", Menu => "MENU", Meter => "METER", Nav => "NAV",
        Noscript => "NOSCRIPT", Object => "OBJECT", Ol => "OL", Optgroup => "OPTGROUP",
        Option => "OPTION", Output => "OUTPUT", P => "P", Picture => "PICTURE", Pre => "PRE",
        Progress => "PROGRESS", Q => "Q", Rb => "RB", Rp => "RP", Rt => "RT", Rtc => "RTC",
        Ruby => "RUBY", S => "S", Samp => "SAMP", Script => "SCRIPT", Section => "SECTION",
        Select => "SELECT", Slot => "SLOT", Small => "SMALL", Span => "SPAN",
        Strong => "STRONG", Style => "STYLE", Sub => "SUB", Summary => "SUMMARY", Sup => "SUP",
        Svg => "SVG", Table => "TABLE", Tbody => "TBODY", Td => "TD", Template => "TEMPLATE",
        Textarea => "TEXTAREA", Tfoot => "TFOOT", Th => "TH", Thead => "THEAD", Time => "TIME",
        Title => "TITLE", Tr => "TR", U => "U", Ul => "UL", Var => "VAR", Video => "VIDEO",
    ],
}

/// Elements that end an open `<p>`.
const NOT_IN_PARAGRAPH: &[TagKind] = &[
    TagKind::Address,
    TagKind::Article,
    TagKind::Aside,
    TagKind::Blockquote,
    TagKind::Details,
    TagKind::Div,
    TagKind::Dl,
    TagKind::Fieldset,
    TagKind::Figcaption,
    TagKind::Figure,
    TagKind::Footer,
    TagKind::Form,
    TagKind::H1,
    TagKind::H2,
    TagKind::H3,
    TagKind::H4,
    TagKind::H5,
    TagKind::H6,
    TagKind::Header,
    TagKind::Hr,
    TagKind::Main,
    TagKind::Nav,
    TagKind::Ol,
    TagKind::P,
    TagKind::Pre,
    TagKind::Section,
];

impl TagKind {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> TagKind {
        Self::ALL
            .get(code as usize)
            .copied()
            .unwrap_or(TagKind::Unknown)
    }

    pub fn is_void(self) -> bool {
        Self::VOID.contains(&self)
    }
}

/// An open HTML element on the scanner's stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    /// Upper-cased name, kept for custom elements only.
    pub name: String,
}

impl Tag {
    /// Tag for an upper-cased element name.
    pub fn for_name(name: String) -> Tag {
        match TagKind::from_name(&name) {
            TagKind::Custom => Tag {
                kind: TagKind::Custom,
                name,
            },
            kind => Tag::new(kind),
        }
    }

    pub fn new(kind: TagKind) -> Tag {
        Tag {
            kind,
            name: String::new(),
        }
    }

    pub fn is_void(&self) -> bool {
        self.kind.is_void()
    }

    /// Whether `child` may open inside this element without closing it first.
    pub fn can_contain(&self, child: &Tag) -> bool {
        let child = child.kind;
        match self.kind {
            TagKind::Li => child != TagKind::Li,
            TagKind::Dt | TagKind::Dd => !matches!(child, TagKind::Dt | TagKind::Dd),
            TagKind::P => !NOT_IN_PARAGRAPH.contains(&child),
            TagKind::Colgroup => child == TagKind::Col,
            TagKind::Rb | TagKind::Rt | TagKind::Rp => {
                !matches!(child, TagKind::Rb | TagKind::Rt | TagKind::Rp)
            }
            TagKind::Optgroup => child != TagKind::Optgroup,
            TagKind::Tr => child != TagKind::Tr,
            TagKind::Td | TagKind::Th => !matches!(child, TagKind::Td | TagKind::Th | TagKind::Tr),
            _ => true,
        }
    }
}

impl Default for Tag {
    fn default() -> Self {
        Tag::new(TagKind::Unknown)
    }
}
