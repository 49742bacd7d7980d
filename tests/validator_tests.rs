//! Reader and validator fixtures run end to end.
use std::sync::Arc;

use doctype_validator::error::{ErrorKind, ParseError, Result};
use doctype_validator::handler::Handler;
use doctype_validator::parser::{Declaration, Parser};
use doctype_validator::schema::{Attribute, Doctype};
use doctype_validator::validation::Validator;

const FIXTURE_DOCTYPE: &str = "<doctype>\
    <element name=doc content=a? omit>\
    <attribute name=attr values=a,b,c default=a>\
    <element name=book><attribute name=title required>\
    <element name=content content=a,b,c+,d*,e?,(f|x,g|y),h?+>\
    <element name=parent content=a>\
    <element name=a empty>\
    <element name=b empty>\
    <element name=c empty>\
    <element name=d empty>\
    <element name=e empty>\
    <element name=f empty>\
    <element name=g empty>\
    <element name=h include=i>\
    <element name=i content=j>\
    <element name=j exclude=i>\
    <element name=x empty>\
    <element name=y empty>\
    <element name=z>";

const DECLARATION_PARAMS: &[&str] = &[
    "param",
    "\"param\"",
    "'param'",
    "'par am'",
    "(par( )am)",
    "(par( )am)+",
    "(par( )am)*",
    "(par( )am)?",
    "+(par( )am)",
    "-(par( )am)",
    "-",
];

/// Handler that checks the validated events against the conventions of the
/// fixtures: text inside an element repeats the element name, comments read
/// `comm-ent`, and so on.
#[derive(Default)]
struct FixtureHandler {
    doctype: Option<Arc<Doctype>>,
    stack: Vec<String>,
}

impl Handler for FixtureHandler {
    fn doctype(&mut self, doctype: &Arc<Doctype>) -> Result<()> {
        self.doctype = Some(doctype.clone());
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        if !text.is_empty() && text != "comm-ent" {
            return Err(ParseError::custom("Unexpected comment text.", text));
        }
        Ok(())
    }

    fn declaration(&mut self, declaration: &Declaration) -> Result<()> {
        if declaration.name != "decl" {
            return Err(ParseError::custom(
                "Unexpected declaration name.",
                declaration.name.as_str(),
            ));
        }
        if let Some(param) = declaration
            .params
            .iter()
            .find(|param| !DECLARATION_PARAMS.contains(&param.as_str()))
        {
            return Err(ParseError::custom(
                "Unexpected declaration parameter.",
                param.as_str(),
            ));
        }
        declaration
            .subset
            .iter()
            .try_for_each(|decl| self.declaration(decl))
    }

    fn pi(&mut self, instruction: &str) -> Result<()> {
        if instruction != "pi" {
            return Err(ParseError::custom(
                "Unexpected processing instruction.",
                instruction,
            ));
        }
        Ok(())
    }

    fn entity(&mut self, name: &str) -> Result<()> {
        if name != "ent" {
            return Err(ParseError::custom("Unexpected entity.", name));
        }
        Ok(())
    }

    fn open(&mut self, name: &str, attributes: Vec<Attribute>) -> Result<()> {
        let doctype = self.doctype.as_ref().expect("doctype forwarded first");
        if !doctype.element(name).expect("declared element").is_empty() {
            self.stack.push(name.to_string());
        }
        for attr in &attributes {
            let attr_name = attr.name.as_deref().unwrap_or_default();
            if !attr_name.eq_ignore_ascii_case("attr") {
                return Err(ParseError::custom("Unexpected attribute name.", attr_name));
            }
            if !["", "a", "b", "c"].contains(&attr.value.as_str()) {
                return Err(ParseError::custom(
                    "Unexpected attribute value.",
                    attr.value.as_str(),
                ));
            }
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(chr), None) if chr > ' ' => {
                Err(ParseError::custom("Expected whitespace here.", text))
            }
            (Some(_), Some(_)) => match self.stack.last() {
                Some(elem) if elem == text => Ok(()),
                Some(elem) => Err(ParseError::custom(format!("Expected '{elem}' here."), text)),
                None => Err(ParseError::custom("Unexpected text.", text)),
            },
            _ => Ok(()),
        }
    }

    fn marked_characters(&mut self, param: &str, text: &str) -> Result<()> {
        if param != "CDATA" {
            return Err(ParseError::custom("Expected 'CDATA' here.", param));
        }
        self.characters(text)
    }

    fn close(&mut self, name: &str) -> Result<()> {
        match self.stack.pop() {
            Some(current) if current.eq_ignore_ascii_case(name) => Ok(()),
            _ => Err(ParseError::custom("Unexpected close tag.", name)),
        }
    }
}

fn fixture_doctype() -> Arc<Doctype> {
    Arc::new(Doctype::parse(FIXTURE_DOCTYPE).expect("fixture doctype parses"))
}

fn run(doctype: &Arc<Doctype>, document: &str) -> Result<()> {
    let mut validator = Validator::new(FixtureHandler::default());
    validator.doctype(doctype)?;
    Parser::new().parse(document, &mut validator)
}

fn check(cases: &[(&str, Option<ErrorKind>)]) {
    let doctype = fixture_doctype();
    for &(document, expected) in cases {
        let outcome = run(&doctype, document);
        match (outcome, expected) {
            (Ok(()), None) => {}
            (Err(err), Some(kind)) => assert_eq!(err.kind, kind, "{document:?}: {err}"),
            (Ok(()), Some(kind)) => panic!("{document:?}: expected {kind:?}, got no error"),
            (Err(err), None) => panic!("{document:?}: unexpected error: {err}"),
        }
    }
}

#[test]
fn test_basic_syntax() {
    check(&[
        ("", None),
        (" ", None),
        ("\n", None),
        ("<", Some(ErrorKind::UnexpectedEndOfFile)),
        ("<?pi>", None),
        (" <?pi> ", None),
        ("&ent;", None),
        ("&ent;<?pi>", None),
        (" &ent; <?pi> ", None),
    ]);
}

#[test]
fn test_comments() {
    check(&[
        ("<!>", None),
        ("<!---->", None),
        ("<!--comm-ent-->", None),
        ("<!--comm-ent--   > ", None),
        ("<!--comm-ent-- --comm-ent--> ", None),
        ("<!--comm-ent-- --comm-ent-- > ", None),
        ("<!--comm-ent-- --comm-ent-- ----> ", None),
        ("<!--comm-ent----comm-ent------> ", None),
        ("<doc><!--comm-ent-->doc", None),
        ("<!->", Some(ErrorKind::ExpectedHyHere)),
        ("<!---- X>", Some(ErrorKind::ExpectedGtHere)),
    ]);
}

#[test]
fn test_marked_sections() {
    check(&[
        ("<doc><![CDATA[]]></DOC>", None),
        ("<doc><![CDATA[doc]]>", None),
        ("<doc><![ CDATA [doc]] >doc", None),
        ("<![CDATA CDATA[]]>", Some(ErrorKind::ExpectedObHere)),
        ("<![CDATA[]] X>", Some(ErrorKind::ExpectedGtHere)),
        ("<![]>", Some(ErrorKind::ExpectedObHere)),
    ]);
}

#[test]
fn test_declarations() {
    check(&[
        ("<!decl>", None),
        ("<!decl >", None),
        ("<!decl param>", None),
        ("<!decl param >", None),
        ("<!decl --comment-- param ---- >", None),
        ("<!decl--comment--param---->", None),
        ("<!decl--comment--parm---c-->", Some(ErrorKind::Other)),
        ("<!decl param \"param\">", None),
        ("<!decl param 'param' >", None),
        ("<!decl 'par am'>", None),
        ("<!decl (par( )am)>", None),
        ("<!decl (par( )am)+'par am' >", None),
        ("<!decl (par( )am)*param>", None),
        ("<!decl (par( )am)?--comment--'par am'>", None),
        ("<!decl +(par( )am) -(par( )am)>", None),
        ("<!decl -(par( )am)--comment--->", None),
        ("<!decl[]>", None),
        ("<!decl[<!decl>]>", None),
        ("<!decl 'param'[ <!decl > ] >", None),
        ("<!decl 'param' [ <!decl[<!decl>]> ] >", None),
        ("<!decl param[<!decl[<!decl param>]>]>", None),
        ("<!decl[%ent;]>", None),
        ("<!decl[%ent;<?pi>]>", None),
        ("<!decl[%ent;<!--comment-->]>", None),
        ("<!decl[%ent;<![ INCLUDE[<!---c--> <?pi> <!decl>]]>]>", None),
        (
            "<!decl[%ent;<![ INCLUDE[<!><?pi>%pr;<!declr>]]>]>",
            Some(ErrorKind::Other),
        ),
        ("<! >", Some(ErrorKind::InvalidDeclaration)),
        ("<!decl[<a>]>", Some(ErrorKind::ExpectedExOrQmHere)),
        ("<!decl[a]>", Some(ErrorKind::ExpectedLtOrCbHere)),
        ("<!decl--comment--param2---->", Some(ErrorKind::Other)),
    ]);
}

#[test]
fn test_tags() {
    check(&[
        ("<a>", None),
        ("<a> </a>", Some(ErrorKind::UnexpectedCloseTag)),
        ("<z>", Some(ErrorKind::CloseElementMissing)),
        ("<z/>", None),
        ("<z />", None),
        ("<z></z>", None),
        ("<parent>", Some(ErrorKind::CloseElementMissing)),
        ("<parent><a>parent</>", None),
        ("<parent><a>parent</parent>", None),
        ("<doc>doc<a></><b>", None),
        ("<doc>doc</doc>", None),
        ("<doc>doc<a>doc", None),
        ("<doc<a</doc>", None),
        ("<i<j</j</i>", None),
        ("<>", Some(ErrorKind::InvalidTagName)),
        ("<doc></ doc>", Some(ErrorKind::ExpectedLtOrGtHere)),
        ("<wibble>", Some(ErrorKind::ElementNotDeclared)),
    ]);
}

#[test]
fn test_content_models() {
    check(&[
        ("<content><A><B><C><D><E><F><G></content>", None),
        ("<content><B></content>", Some(ErrorKind::ElementNotPermitted)),
        ("<content><A><B><C><c><D><E><F><G></content>", None),
        (
            "<content><A><B><D><E><F><G></content>",
            Some(ErrorKind::ElementNotPermitted),
        ),
        ("<content><A><B><C><E><F><G></content>", None),
        ("<content><A><B><C><d><d><E><F><G></content>", None),
        ("<content><A><B><C><d><F><G></content>", None),
        ("<content><A><B><C><F><G></content>", None),
        ("<content><A><B><C><e><F><G></content>", None),
        (
            "<content><A><B><C><e><e><F><G></content>",
            Some(ErrorKind::ElementNotPermitted),
        ),
        ("<content><A><B><C><X><Y></content>", None),
        ("<content><A><B><C><F><Y></content>", None),
        ("<content><A><B><C><X><G></content>", None),
        (
            "<content><A><B><C><Y></content>",
            Some(ErrorKind::ElementNotPermitted),
        ),
        (
            "<content><A><B><C></content>",
            Some(ErrorKind::CloseElementNotPermitted),
        ),
        ("<content>", Some(ErrorKind::CloseElementMissing)),
        (
            "<content></content>",
            Some(ErrorKind::CloseElementNotPermitted),
        ),
    ]);
}

#[test]
fn test_inclusions_and_exclusions() {
    check(&[
        ("<h><i><j></j></i></h>", None),
        ("<h><i><j></j></i><i><j></j></i></h>", None),
        ("<h><i><j></j><i><j></j></i></i></h>", None),
        (
            "<h><i><j><i><j></j></i></j></i></h>",
            Some(ErrorKind::ElementNotPermitted),
        ),
    ]);
}

#[test]
fn test_attributes() {
    check(&[
        ("<doc attr=''>", None),
        ("<doc attr=c>", None),
        ("<doc attr='b'>", None),
        ("<doc attr=\"c\">", None),
        ("<doc attr=a >", None),
        ("<doc attr = a>", None),
        ("<doc attr =a >", None),
        ("<doc attr= a>", None),
        ("<doc b>", None),
        ("<doc c >", None),
        ("<doc d>", Some(ErrorKind::UndeclaredAttribute)),
        ("<doc a b>", Some(ErrorKind::DuplicateAttribute)),
        ("<doc ATTR=D>", Some(ErrorKind::AttributeValueNotPermitted)),
        ("<book>", Some(ErrorKind::RequiredAttributeMissing)),
    ]);
}

#[test]
fn test_one_or_more_boundary() {
    let doctype = Arc::new(
        Doctype::parse("<doctype><element name=s content=a+,a><element name=a empty>").unwrap(),
    );
    assert_eq!(
        run(&doctype, "<s><a></s>").unwrap_err().kind,
        ErrorKind::CloseElementNotPermitted
    );
    run(&doctype, "<s><a><a></s>").unwrap();
    run(&doctype, "<s><a><a><a></s>").unwrap();
}

#[test]
fn test_unminimized_events() {
    use doctype_validator::handler::MarkupWriter;

    let doctype = fixture_doctype();
    let mut validator = Validator::new(MarkupWriter::new());
    validator.doctype(&doctype).unwrap();
    Parser::new()
        .parse("<doc b><a><!--comm-ent-->", &mut validator)
        .unwrap();
    assert_eq!(
        validator.handler().as_str(),
        "<doc attr=\"b\"><a><!--comm-ent--></doc>"
    );
}

#[test]
fn test_error_reports_path_and_line() {
    let doctype = fixture_doctype();
    let err = run(&doctype, "<h>\n<i>\n<j>\n<i>").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ElementNotPermitted);
    assert_eq!(err.item, "i");
    assert_eq!(err.location, "<h><i><j>");
    assert_eq!(err.line, 4);
}
