//! SNBT rendering through `Display` and `Debug`.
//!
//! The plain formatter produces compact SNBT; the alternate formatter (`{:#}`, `{:#?}`)
//! indents nested lists, compounds and arrays by four spaces.

use std::{borrow::Cow, fmt};
use std::fmt::{Debug, Display, Formatter};

use log::warn;

use crate::settings::{SnbtWriteOptions, WriteNonFinite};
use super::{NbtCompound, NbtList, NbtTag};


impl NbtTag {
    /// Converts this NBT tag into SNBT with no extraneous spacing, using the given options.
    pub fn to_snbt_with_options(&self, opts: SnbtWriteOptions) -> String {
        format!("{:?}", TagWithOptions::new(self, opts))
    }

    /// Returns whether or not the given string needs to be quoted to form valid SNBT.
    #[inline]
    pub fn should_quote(string: &str) -> bool {
        let Some(first) = string.chars().next() else {
            return true;
        };

        // A leading digit, sign or dot would make the reader attempt a number.
        if starts_unquoted_number(first) {
            return true;
        }

        if !string.chars().all(allowed_unquoted) {
            return true;
        }

        is_ambiguous(string)
    }

    /// If necessary, wraps the given string in quotes and escapes any quotes
    /// contained in the original string.
    pub fn string_to_snbt(string: &str) -> Cow<'_, str> {
        if !Self::should_quote(string) {
            return Cow::Borrowed(string);
        }

        // Pick the quote that needs no escaping when possible
        let surrounding = if string.contains('"') { '\'' } else { '"' };

        let mut snbt_string = String::with_capacity(2 + string.len());
        snbt_string.push(surrounding);

        for ch in string.chars() {
            if ch == surrounding || ch == '\\' {
                snbt_string.push('\\');
            }
            snbt_string.push(ch);
        }

        snbt_string.push(surrounding);
        Cow::Owned(snbt_string)
    }

    #[inline]
    fn to_formatted_snbt(&self, f: &mut Formatter<'_>, opts: SnbtWriteOptions) -> fmt::Result {
        self.recursively_format_snbt(&mut String::new(), f, 0, opts)
    }

    pub(super) fn recursively_format_snbt(
        &self,
        indent:        &mut String,
        f:             &mut Formatter<'_>,
        current_depth: u32,
        opts:          SnbtWriteOptions,
    ) -> fmt::Result {
        let ts = self.type_specifier();

        match self {
            Self::Byte(value)      => write_suffixed(value, ts, f),
            Self::Short(value)     => write_suffixed(value, ts, f),
            Self::Int(value)       => write_suffixed(value, ts, f),
            Self::Long(value)      => write_suffixed(value, ts, f),
            Self::Float(value)     => write_float(*value, ts, opts, f),
            Self::Double(value)    => write_float(*value, ts, opts, f),
            Self::ByteArray(value) => write_array(value, indent, "B", f),
            Self::String(value)    => write!(f, "{}", Self::string_to_snbt(value)),
            Self::List(value) => if current_depth >= opts.depth_limit.0 {
                write_depth_message("List", opts, f)
            } else {
                // Lists and compounds increment the depth for their own elements
                value.recursively_format_snbt(indent, f, current_depth, opts)
            },
            Self::Compound(value) => if current_depth >= opts.depth_limit.0 {
                write_depth_message("Compound", opts, f)
            } else {
                value.recursively_format_snbt(indent, f, current_depth, opts)
            },
            Self::IntArray(value)  => write_array(value, indent, "I", f),
            Self::LongArray(value) => write_array(value, indent, "L", f),
        }
    }
}

impl NbtList {
    /// Used in the `display_and_debug` macro
    #[inline]
    fn to_formatted_snbt(&self, f: &mut Formatter<'_>, opts: SnbtWriteOptions) -> fmt::Result {
        self.recursively_format_snbt(&mut String::new(), f, 0, opts)
    }

    #[expect(clippy::write_with_newline)]
    fn recursively_format_snbt(
        &self,
        indent:        &mut String,
        f:             &mut Formatter<'_>,
        current_depth: u32,
        opts:          SnbtWriteOptions,
    ) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[]");
        }

        if f.alternate() {
            indent.push_str("    ");
            write!(f, "[\n")?;
        } else {
            write!(f, "[")?;
        }

        let last_index = self.len() - 1;
        for (index, element) in self.iter().enumerate() {
            if f.alternate() {
                write!(f, "{indent}")?;
            }

            element.recursively_format_snbt(indent, f, current_depth + 1, opts)?;

            if index != last_index {
                if f.alternate() {
                    write!(f, ",\n")?;
                } else {
                    write!(f, ",")?;
                }
            }
        }

        if f.alternate() {
            indent.truncate(indent.len() - 4);
            write!(f, "\n{indent}]")
        } else {
            write!(f, "]")
        }
    }
}

impl NbtCompound {
    /// Used in the `display_and_debug` macro
    #[inline]
    fn to_formatted_snbt(&self, f: &mut Formatter<'_>, opts: SnbtWriteOptions) -> fmt::Result {
        self.recursively_format_snbt(&mut String::new(), f, 0, opts)
    }

    #[expect(clippy::write_with_newline)]
    fn recursively_format_snbt(
        &self,
        indent:        &mut String,
        f:             &mut Formatter<'_>,
        current_depth: u32,
        opts:          SnbtWriteOptions,
    ) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }

        if f.alternate() {
            indent.push_str("    ");
            write!(f, "{{\n")?;
        } else {
            write!(f, "{{")?;
        }

        let last_index = self.len() - 1;
        for (index, (key, value)) in self.iter().enumerate() {
            let key = NbtTag::string_to_snbt(key);

            if f.alternate() {
                write!(f, "{indent}{key}: ")?;
            } else {
                write!(f, "{key}:")?;
            }

            // Depth limits are checked in `NbtTag::recursively_format_snbt`
            value.recursively_format_snbt(indent, f, current_depth + 1, opts)?;

            if index != last_index {
                if f.alternate() {
                    write!(f, ",\n")?;
                } else {
                    write!(f, ",")?;
                }
            }
        }

        if f.alternate() {
            indent.truncate(indent.len() - 4);
            write!(f, "\n{indent}}}")
        } else {
            write!(f, "}}")
        }
    }
}

#[inline]
fn write_suffixed(value: &impl Display, ts: Option<&str>, f: &mut Formatter<'_>) -> fmt::Result {
    Display::fmt(value, f)?;
    match ts {
        Some(ts) => f.write_str(ts),
        None     => Ok(()),
    }
}

/// The float types that can be written to SNBT.
trait SnbtFloat: Display + Copy {
    const MAX:         Self;
    const MIN:         Self;
    const WORD_SUFFIX: &'static str;

    fn is_finite(self) -> bool;
    fn is_nan(self) -> bool;
    fn is_sign_positive(self) -> bool;
}

macro_rules! snbt_float {
    ($($float:ty, $suffix:literal);* $(;)?) => {
        $(
            impl SnbtFloat for $float {
                const MAX:         Self = <$float>::MAX;
                const MIN:         Self = <$float>::MIN;
                const WORD_SUFFIX: &'static str = $suffix;

                #[inline]
                fn is_finite(self) -> bool {
                    <$float>::is_finite(self)
                }

                #[inline]
                fn is_nan(self) -> bool {
                    <$float>::is_nan(self)
                }

                #[inline]
                fn is_sign_positive(self) -> bool {
                    <$float>::is_sign_positive(self)
                }
            }
        )*
    };
}

snbt_float!(
    f32, "f";
    f64, "d";
);

fn write_float<F: SnbtFloat>(
    value: F,
    ts:    Option<&str>,
    opts:  SnbtWriteOptions,
    f:     &mut Formatter<'_>,
) -> fmt::Result {
    if value.is_finite() {
        return write_suffixed(&value, ts, f);
    }

    match opts.non_finite {
        WriteNonFinite::PrintFloats => {
            if value.is_nan() {
                write_suffixed(&"NaN", ts, f)
            } else if value.is_sign_positive() {
                write_suffixed(&F::MAX, ts, f)
            } else {
                write_suffixed(&F::MIN, ts, f)
            }
        }
        WriteNonFinite::PrintStrings => {
            let word = if value.is_nan() {
                "NaN"
            } else if value.is_sign_positive() {
                "Infinity"
            } else {
                "-Infinity"
            };
            write!(f, "{word}{}", F::WORD_SUFFIX)
        }
    }
}

#[expect(clippy::write_with_newline)]
fn write_array(
    list:   &[impl Display],
    indent: &mut String,
    ts:     &str,
    f:      &mut Formatter<'_>,
) -> fmt::Result {
    if list.is_empty() {
        return write!(f, "[{ts};]");
    }

    if f.alternate() {
        indent.push_str("    ");
        write!(f, "[\n{indent}{ts};\n")?;
    } else {
        write!(f, "[{ts};")?;
    }

    let last_index = list.len() - 1;
    for (index, element) in list.iter().enumerate() {
        if f.alternate() {
            write!(f, "{indent}")?;
        }
        Display::fmt(element, f)?;
        if index != last_index {
            if f.alternate() {
                write!(f, ",\n")?;
            } else {
                write!(f, ",")?;
            }
        }
    }

    if f.alternate() {
        indent.truncate(indent.len() - 4);
        write!(f, "\n{indent}]")
    } else {
        write!(f, "]")
    }
}

/// Formatting cannot fail on bad data, so a tag nested past the limit is replaced by a
/// quoted message.
fn write_depth_message(
    tag_name: &str,
    opts:     SnbtWriteOptions,
    f:        &mut Formatter<'_>,
) -> fmt::Result {
    warn!(
        "SNBT depth limit of {} reached; replacing a {tag_name} tag with a message",
        opts.depth_limit.0,
    );
    let message = format!(
        "Depth limit of {} reached; could not add {tag_name} tag",
        opts.depth_limit.0,
    );
    write!(f, "{}", NbtTag::string_to_snbt(&message))
}

#[inline]
fn starts_unquoted_number(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.')
}

#[inline]
fn allowed_unquoted(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '+')
}

#[inline]
fn is_ambiguous(string: &str) -> bool {
    string.eq_ignore_ascii_case("true") || string.eq_ignore_ascii_case("false")
}

macro_rules! display_and_debug {
    ($tag:ty, $name:ident) => {
        impl Display for $tag {
            #[inline]
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                self.to_formatted_snbt(f, SnbtWriteOptions::default())
            }
        }

        impl Debug for $tag {
            #[inline]
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                self.to_formatted_snbt(f, SnbtWriteOptions::default())
            }
        }

        /// Formats the wrapped value as SNBT with custom [`SnbtWriteOptions`].
        pub struct $name<'a> {
            tag:  &'a $tag,
            opts: SnbtWriteOptions,
        }

        impl<'a> $name<'a> {
            #[inline]
            pub fn new(tag: &'a $tag, opts: SnbtWriteOptions) -> Self {
                Self { tag, opts }
            }
        }

        impl Display for $name<'_> {
            #[inline]
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                self.tag.to_formatted_snbt(f, self.opts)
            }
        }

        impl Debug for $name<'_> {
            #[inline]
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                self.tag.to_formatted_snbt(f, self.opts)
            }
        }
    };
}

display_and_debug!(NbtTag, TagWithOptions);
display_and_debug!(NbtList, ListWithOptions);
display_and_debug!(NbtCompound, CompoundWithOptions);
