//! Classfile analysis and profile line tests
//!
//! Classfiles are assembled with the builder in `common`, then decoded and
//! rendered into public and package-private profiles.

mod common;

use classdeps::classfile::ClassAnalysis;
use classdeps::{ClassId, Error, ProfileLines, Visibility};
use common::*;
use pretty_assertions::assert_eq;

fn id(s: &str) -> ClassId {
    ClassId::parse(s).unwrap()
}

fn profiles(bytes: &[u8]) -> ProfileLines {
    let mut lines = ProfileLines::new();
    ClassAnalysis::parse(None, bytes).unwrap().create_profiles(&mut lines);
    lines
}

fn sorted(lines: &[&str]) -> Vec<String> {
    let mut v: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
    v.sort();
    v
}

fn as_vec(set: &std::collections::BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

#[cfg(test)]
mod profile_line_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_public_class_with_mixed_members() {
        let mut b = ClassBuilder::new("a/B", ACC_PUBLIC | ACC_SUPER);
        b.field(ACC_PRIVATE, "x", "I")
            .field(0, "count", "J")
            .method(ACC_PUBLIC, "m", "()V")
            .method(ACC_STATIC, "<clinit>", "()V");
        let lines = profiles(&b.build());

        assert_eq!(
            as_vec(&lines.public),
            sorted(&["a/B class public Ljava/lang/Object;", "a/B.m method public ()V"])
        );
        assert_eq!(
            as_vec(&lines.package),
            sorted(&[
                "a/B class public Ljava/lang/Object;",
                "a/B.count field J",
                "a/B.m method public ()V",
            ])
        );
    }

    #[test]
    fn test_package_private_class_only_in_package_profile() {
        let mut b = ClassBuilder::new("a/Hidden", ACC_FINAL);
        b.interface("java/lang/Runnable").method(ACC_PUBLIC, "run", "()V");
        let lines = profiles(&b.build());

        assert!(lines.public.is_empty());
        assert_eq!(
            as_vec(&lines.package),
            sorted(&[
                "a/Hidden class final Ljava/lang/Object;Ljava/lang/Runnable;",
                "a/Hidden.run method public ()V",
            ])
        );
    }

    #[test]
    fn test_class_kinds() {
        let cases = [
            (ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT, "iface"),
            (ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION, "annot"),
            (ACC_PUBLIC | ACC_FINAL | ACC_ENUM, "enums"),
            (ACC_PUBLIC | ACC_ABSTRACT, "class abstract"),
        ];
        for (flags, kind) in cases {
            let mut b = ClassBuilder::new("k/K", flags);
            let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();
            assert_eq!(
                analysis.profile_class_line().unwrap(),
                format!("k/K {} public Ljava/lang/Object;", kind)
            );
        }
    }

    #[test]
    fn test_generic_signature_replaces_erased_one() {
        let mut b = ClassBuilder::new("a/Box", ACC_PUBLIC);
        b.interface("java/lang/Iterable")
            .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/lang/Iterable<TT;>;");
        let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();
        assert_eq!(
            analysis.signature(),
            Some("<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/lang/Iterable<TT;>;")
        );
        assert_eq!(analysis.interfaces(), &[id("java/lang/Iterable")]);
    }

    #[test]
    fn test_object_has_no_superclass() {
        let mut b = ClassBuilder::new("java/lang/Object", ACC_PUBLIC);
        b.no_superclass();
        let analysis = ClassAnalysis::parse(Some(&id("java/lang/Object")), &b.build()).unwrap();
        assert_eq!(analysis.superclass(), None);
        assert_eq!(analysis.signature(), Some(""));
        assert_eq!(analysis.profile_class_line().unwrap(), "java/lang/Object class public ");
    }

    #[test]
    fn test_field_constants_and_annotations() {
        let mut b = ClassBuilder::new("a/Consts", ACC_PUBLIC);
        let big = b.long(1 << 40);
        let ratio = b.double(0.5);
        let greeting = b.string("hi \"you\"\n");
        let annotation = b.annotation_body("La/Tag;", &[("b", 2), ("a", 1)]);
        b.field_with(
            ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
            "BIG",
            "J",
            vec![("ConstantValue", big.to_be_bytes().to_vec())],
        )
        .field_with(
            ACC_PROTECTED | ACC_STATIC | ACC_FINAL,
            "RATIO",
            "D",
            vec![("ConstantValue", ratio.to_be_bytes().to_vec()), ("Deprecated", Vec::new())],
        )
        .field_with(
            ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
            "GREETING",
            "Ljava/lang/String;",
            vec![
                ("ConstantValue", greeting.to_be_bytes().to_vec()),
                ("RuntimeVisibleAnnotations", annotation),
            ],
        );
        let lines = profiles(&b.build());

        assert_eq!(
            as_vec(&lines.public),
            sorted(&[
                "a/Consts class public Ljava/lang/Object;",
                "a/Consts.BIG field public static final J=1099511627776",
                "a/Consts.GREETING field public static final Ljava/lang/String;=\"hi \\\"you\\\"\\n\" @La/Tag;(a=1,b=2)",
                "a/Consts.RATIO field protected static final deprecated D=0.5",
            ])
        );
    }

    #[test]
    fn test_method_exceptions_and_synthetic_members() {
        let mut b = ClassBuilder::new("a/Io", ACC_PUBLIC);
        let io = b.class("java/io/IOException");
        let bad = b.class("a/BadThing");
        let mut exceptions = 2u16.to_be_bytes().to_vec();
        exceptions.extend_from_slice(&io.to_be_bytes());
        exceptions.extend_from_slice(&bad.to_be_bytes());
        b.method_with(ACC_PUBLIC, "read", "()I", vec![("Exceptions", exceptions)])
            .method(ACC_PUBLIC | ACC_SYNTHETIC, "access$000", "()V")
            .method_with(ACC_PUBLIC, "bridge", "()V", vec![("Synthetic", Vec::new())]);
        let lines = profiles(&b.build());

        assert_eq!(
            as_vec(&lines.public),
            sorted(&[
                "a/Io class public Ljava/lang/Object;",
                "a/Io.read method public ()I ^a/BadThing ^java/io/IOException",
            ])
        );
    }

    #[test]
    fn test_anonymous_class_contributes_nothing() {
        let mut b = ClassBuilder::new("a/B$1", ACC_PUBLIC);
        b.field(ACC_PUBLIC, "f", "I").method(ACC_PUBLIC, "run", "()V");
        let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();
        assert!(analysis.is_anonymous());
        let mut lines = ProfileLines::new();
        analysis.create_profiles(&mut lines);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_synthetic_class_contributes_nothing() {
        let mut b = ClassBuilder::new("a/Gen", ACC_PUBLIC | ACC_SYNTHETIC);
        b.method(ACC_PUBLIC, "run", "()V");
        assert!(profiles(&b.build()).is_empty());
    }
}

#[cfg(test)]
mod containment_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_private_container_conceals_nested_class() {
        let mut b = ClassBuilder::new("a/B$C$D", ACC_PUBLIC);
        b.method(ACC_PUBLIC, "go", "()V")
            .inner_class(Some("a/B$C$D"), Some("a/B$C"), ACC_PUBLIC | ACC_STATIC)
            .inner_class(Some("a/B$C"), Some("a/B"), ACC_PRIVATE | ACC_STATIC);
        let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();
        assert_eq!(analysis.visibility(), Some(Visibility::Private));
        assert_eq!(analysis.profile_class_line().unwrap(), "a/B$C$D class private Ljava/lang/Object;");

        let mut lines = ProfileLines::new();
        analysis.create_profiles(&mut lines);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_protected_nested_class_keeps_public_surface() {
        let mut b = ClassBuilder::new("a/B$C", ACC_PUBLIC);
        b.method(ACC_PUBLIC, "go", "()V")
            .inner_class(Some("a/B$C"), Some("a/B"), ACC_PROTECTED | ACC_STATIC);
        let lines = profiles(&b.build());
        assert_eq!(
            as_vec(&lines.public),
            sorted(&["a/B$C class protected Ljava/lang/Object;", "a/B$C.go method public ()V"])
        );
    }

    #[test]
    fn test_member_of_anonymous_container_is_hidden() {
        let mut b = ClassBuilder::new("a/B$1$Local", ACC_PUBLIC);
        b.method(ACC_PUBLIC, "go", "()V")
            .inner_class(Some("a/B$1$Local"), Some("a/B$1"), ACC_PUBLIC);
        let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();
        assert!(analysis.is_anonymous());
        assert!(profiles(&b.build()).is_empty());
    }

    #[test]
    fn test_synthetic_container_marks_class_synthetic() {
        let mut b = ClassBuilder::new("a/B$C", ACC_PUBLIC);
        b.inner_class(Some("a/B$C"), Some("a/B"), ACC_PUBLIC | ACC_SYNTHETIC);
        let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();
        assert!(analysis.is_synthetic());
    }

    #[test]
    fn test_self_referential_inner_table_terminates() {
        let mut b = ClassBuilder::new("a/B$C", ACC_PUBLIC);
        b.inner_class(Some("a/B$C"), Some("a/B$C"), ACC_PROTECTED);
        let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();
        assert_eq!(analysis.visibility(), Some(Visibility::Protected));
    }

    #[test]
    fn test_containment_cycle_terminates() {
        let mut b = ClassBuilder::new("a/X$Y", ACC_PUBLIC);
        b.inner_class(Some("a/X$Y"), Some("a/X$Z"), ACC_PUBLIC)
            .inner_class(Some("a/X$Z"), Some("a/X$Y"), 0);
        let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();
        assert_eq!(analysis.visibility(), Some(Visibility::Package));
    }

    #[test]
    fn test_entries_with_zero_indices_are_ignored() {
        let mut b = ClassBuilder::new("a/B$C", ACC_PUBLIC);
        b.inner_class(Some("a/B$C"), None, ACC_PRIVATE)
            .inner_class(None, Some("a/B"), ACC_PRIVATE);
        let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();
        assert!(analysis.inner_classes().unwrap().is_empty());
        assert_eq!(analysis.visibility(), Some(Visibility::Public));
    }
}

#[cfg(test)]
mod load_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identity_mismatch() {
        let mut b = ClassBuilder::new("a/B", ACC_PUBLIC);
        let mut analysis = ClassAnalysis::new();
        let err = analysis.load(Some(&id("a/C")), &b.build()).unwrap_err();
        match err {
            Error::IdentityMismatch { expected, found } => {
                assert_eq!(expected, id("a/C"));
                assert_eq!(found, id("a/B"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!analysis.is_loaded());
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = ClassBuilder::new("a/B", ACC_PUBLIC).build();
        bytes[3] = 0xBF;
        assert!(matches!(ClassAnalysis::parse(None, &bytes), Err(Error::Format { .. })));
    }

    #[test]
    fn test_truncated_classfile() {
        let bytes = ClassBuilder::new("a/B", ACC_PUBLIC).build();
        for cut in [4, 10, bytes.len() - 1] {
            assert!(ClassAnalysis::parse(None, &bytes[..cut]).is_err(), "cut at {}", cut);
        }
    }

    #[test]
    fn test_reload_replaces_previous_state() {
        let mut analysis = ClassAnalysis::new();
        let mut first = ClassBuilder::new("a/First", ACC_PUBLIC);
        first.field(ACC_PUBLIC, "f", "I");
        analysis.load(None, &first.build()).unwrap();
        assert_eq!(analysis.fields().len(), 1);

        analysis.load(None, &ClassBuilder::new("a/Second", 0).build()).unwrap();
        assert_eq!(analysis.class_id(), Some(&id("a/Second")));
        assert!(analysis.fields().is_empty());
        assert_eq!(analysis.major_version(), 52);
    }

    #[test]
    fn test_runtime_references_reduce_to_base_types() {
        let mut b = ClassBuilder::new("a/User", ACC_PUBLIC);
        b.class("[[Lp/Q;");
        b.class("[I");
        b.method_ref("p/Helper", "run", "()V");
        let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();

        let mut refs: Vec<String> = analysis
            .runtime_class_references()
            .iter()
            .map(|c| c.to_string())
            .collect();
        refs.sort();
        assert_eq!(refs, vec!["a/User", "java/lang/Object", "p/Helper", "p/Q"]);
    }

    #[test]
    fn test_unknown_attributes_are_skipped() {
        let mut b = ClassBuilder::new("a/B", ACC_PUBLIC);
        b.class_attribute("SourceFile", vec![0, 1])
            .class_attribute("Vendor", vec![0xFF; 17])
            .method_with(ACC_PUBLIC, "m", "()V", vec![("Code", vec![0; 12])]);
        let analysis = ClassAnalysis::parse(None, &b.build()).unwrap();
        assert_eq!(analysis.methods().len(), 1);
    }
}
