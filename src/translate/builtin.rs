//! Fixed mappings for well-known source types.

use crate::imports::BuiltInWrapper;
use crate::model::Primitive;

pub static JAVA_INTEGER: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaInteger",
    path: "java-wrappers/JavaInteger",
};
pub static JAVA_BYTE: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaByte",
    path: "java-wrappers/JavaByte",
};
pub static JAVA_DOUBLE: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaDouble",
    path: "java-wrappers/JavaDouble",
};
pub static JAVA_FLOAT: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaFloat",
    path: "java-wrappers/JavaFloat",
};
pub static JAVA_LONG: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaLong",
    path: "java-wrappers/JavaLong",
};
pub static JAVA_SHORT: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaShort",
    path: "java-wrappers/JavaShort",
};
pub static JAVA_NUMBER: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaNumber",
    path: "java-wrappers/JavaNumber",
};
pub static JAVA_BIG_INTEGER: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaBigInteger",
    path: "java-wrappers/JavaBigInteger",
};
pub static JAVA_BIG_DECIMAL: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaBigDecimal",
    path: "java-wrappers/JavaBigDecimal",
};
pub static JAVA_TREE_SET: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaTreeSet",
    path: "java-wrappers/JavaTreeSet",
};
pub static JAVA_LINKED_LIST: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaLinkedList",
    path: "java-wrappers/JavaLinkedList",
};
pub static JAVA_TREE_MAP: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaTreeMap",
    path: "java-wrappers/JavaTreeMap",
};
pub static JAVA_OPTIONAL: BuiltInWrapper = BuiltInWrapper {
    symbol: "JavaOptional",
    path: "java-wrappers/JavaOptional",
};

/// How a well-known declared type maps onto the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuiltIn {
    /// A numeric type with a dedicated wrapper and zero-literal default.
    Numeric(&'static BuiltInWrapper),
    /// A fixed target expression.
    Scalar(&'static str),
    /// An abstract numeric type: a wrapper reference with no default.
    Abstract(&'static BuiltInWrapper),
    /// A generic container. `arity` placeholders are used for erased uses.
    Container {
        name: &'static str,
        wrapper: Option<&'static BuiltInWrapper>,
        arity: usize,
    },
    /// `OptionalInt`, rendered as `JavaOptional<JavaInteger>`.
    OptionalInt,
}

/// `None` for `boolean` and `char`, which are not numeric.
pub(crate) fn numeric_primitive(p: Primitive) -> Option<&'static BuiltInWrapper> {
    match p {
        Primitive::Int => Some(&JAVA_INTEGER),
        Primitive::Byte => Some(&JAVA_BYTE),
        Primitive::Double => Some(&JAVA_DOUBLE),
        Primitive::Float => Some(&JAVA_FLOAT),
        Primitive::Short => Some(&JAVA_SHORT),
        Primitive::Long => Some(&JAVA_LONG),
        Primitive::Boolean | Primitive::Char => None,
    }
}

pub(crate) fn lookup(name: &str) -> Option<BuiltIn> {
    use BuiltIn::*;

    let mapping = match name {
        "java.lang.Integer" => Numeric(&JAVA_INTEGER),
        "java.lang.Byte" => Numeric(&JAVA_BYTE),
        "java.lang.Double" => Numeric(&JAVA_DOUBLE),
        "java.lang.Float" => Numeric(&JAVA_FLOAT),
        "java.lang.Short" => Numeric(&JAVA_SHORT),
        "java.lang.Long" => Numeric(&JAVA_LONG),
        "java.math.BigInteger" => Numeric(&JAVA_BIG_INTEGER),
        "java.math.BigDecimal" => Numeric(&JAVA_BIG_DECIMAL),
        "java.lang.Number" => Abstract(&JAVA_NUMBER),
        "java.lang.Boolean" => Scalar("boolean"),
        "java.lang.String" | "java.lang.Character" => Scalar("string"),
        "java.util.OptionalInt" => OptionalInt,
        "java.util.Optional" => Container {
            name: "JavaOptional",
            wrapper: Some(&JAVA_OPTIONAL),
            arity: 1,
        },
        "java.util.TreeMap" => Container {
            name: "JavaTreeMap",
            wrapper: Some(&JAVA_TREE_MAP),
            arity: 2,
        },
        "java.util.Map" | "java.util.HashMap" => Container {
            name: "Map",
            wrapper: None,
            arity: 2,
        },
        "java.util.TreeSet" => Container {
            name: "JavaTreeSet",
            wrapper: Some(&JAVA_TREE_SET),
            arity: 1,
        },
        "java.util.Set" | "java.util.HashSet" => Container {
            name: "Set",
            wrapper: None,
            arity: 1,
        },
        "java.util.LinkedList" => Container {
            name: "JavaLinkedList",
            wrapper: Some(&JAVA_LINKED_LIST),
            arity: 1,
        },
        "java.util.List" | "java.util.ArrayList" | "java.util.Collection" => Container {
            name: "Array",
            wrapper: None,
            arity: 1,
        },
        _ => return None,
    };
    Some(mapping)
}

/// Comment tag for source types with no faithful target equivalent.
pub(crate) fn opaque_tag(name: &str) -> Option<&'static str> {
    let tag = match name {
        "java.lang.Object" => "object",
        "java.util.Date" => "date",
        "java.lang.StackTraceElement" => "stack trace element",
        "java.lang.Throwable" => "throwable",
        "java.lang.Enum" => "enum_",
        "java.lang.Class" => "class",
        "java.util.Map.Entry" => "map entry",
        "java.util.HashMap.Node" => "map node",
        _ => return None,
    };
    Some(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_primitives() {
        assert_eq!(numeric_primitive(Primitive::Int), Some(&JAVA_INTEGER));
        assert_eq!(numeric_primitive(Primitive::Long), Some(&JAVA_LONG));
        assert_eq!(numeric_primitive(Primitive::Char), None);
        assert_eq!(numeric_primitive(Primitive::Boolean), None);
    }

    #[test]
    fn test_lookup_distinguishes_wrapper_containers() {
        assert!(matches!(
            lookup("java.util.TreeMap"),
            Some(BuiltIn::Container { wrapper: Some(_), arity: 2, .. })
        ));
        assert!(matches!(
            lookup("java.util.HashMap"),
            Some(BuiltIn::Container { name: "Map", wrapper: None, .. })
        ));
        assert_eq!(lookup("java.math.BigDecimal"), Some(BuiltIn::Numeric(&JAVA_BIG_DECIMAL)));
        assert_eq!(lookup("com.acme.Foo"), None);
    }

    #[test]
    fn test_opaque_tags() {
        assert_eq!(opaque_tag("java.util.Date"), Some("date"));
        assert_eq!(opaque_tag("java.util.Map.Entry"), Some("map entry"));
        assert_eq!(opaque_tag("java.util.List"), None);
    }
}
