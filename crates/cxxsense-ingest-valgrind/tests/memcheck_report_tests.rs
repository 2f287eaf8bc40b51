use cxxsense_core::select_own_frame;
use cxxsense_ingest_valgrind::{parse_report, parse_str, ValgrindError};
use std::path::Path;

const MEMCHECK_REPORT: &str = r#"<?xml version="1.0"?>

<valgrindoutput>

<protocolversion>4</protocolversion>
<protocoltool>memcheck</protocoltool>

<preamble>
  <line>Memcheck, a memory error detector</line>
</preamble>

<pid>4711</pid>
<tool>memcheck</tool>

<status>
  <state>RUNNING</state>
  <time>00:00:00:00.052 </time>
</status>

<error>
  <unique>0x0</unique>
  <tid>1</tid>
  <kind>InvalidRead</kind>
  <what>Invalid read of size 4</what>
  <stack>
    <frame>
      <ip>0x400544</ip>
      <obj>/proj/build/app</obj>
      <fn>read_value</fn>
      <dir>/proj/src</dir>
      <file>reader.c</file>
      <line>12</line>
    </frame>
    <frame>
      <ip>0x400580</ip>
      <obj>/proj/build/app</obj>
      <fn>main</fn>
      <dir>/proj/src</dir>
      <file>main.c</file>
      <line>30</line>
    </frame>
  </stack>
  <auxwhat>Address 0x51f9044 is 0 bytes after a block of size 4 alloc'd</auxwhat>
  <stack>
    <frame>
      <ip>0x4C2AB80</ip>
      <obj>/usr/lib/valgrind/vgpreload_memcheck-amd64-linux.so</obj>
      <fn>malloc</fn>
    </frame>
  </stack>
</error>

<error>
  <unique>0x1</unique>
  <tid>1</tid>
  <kind>Leak_DefinitelyLost</kind>
  <xwhat>
    <text>8 bytes in 1 blocks are definitely lost in loss record 1 of 1</text>
    <leakedbytes>8</leakedbytes>
    <leakedblocks>1</leakedblocks>
  </xwhat>
  <stack>
    <frame>
      <ip>0x4C2AB80</ip>
      <obj>/usr/lib/valgrind/vgpreload_memcheck-amd64-linux.so</obj>
      <fn>malloc</fn>
      <dir>/build/valgrind/coregrind/m_replacemalloc</dir>
      <file>vg_replace_malloc.c</file>
      <line>299</line>
    </frame>
    <frame>
      <ip>0x400520</ip>
      <obj>/proj/build/app</obj>
      <fn>make_buffer</fn>
      <dir>/proj/src</dir>
      <file>buffer.c</file>
      <line>7</line>
    </frame>
  </stack>
</error>

<errorcounts>
  <pair>
    <count>1</count>
    <unique>0x0</unique>
  </pair>
</errorcounts>

<suppcounts>
</suppcounts>

</valgrindoutput>
"#;

#[test]
fn memcheck_errors_are_read_with_primary_stack() {
    let errors = parse_str(MEMCHECK_REPORT).unwrap();
    assert_eq!(errors.len(), 2);

    let invalid_read = &errors[0];
    assert_eq!(invalid_read.kind, "InvalidRead");
    assert_eq!(invalid_read.what.as_deref(), Some("Invalid read of size 4"));
    assert_eq!(invalid_read.auxiliary.len(), 1);
    assert_eq!(invalid_read.frames.len(), 2);

    let top = &invalid_read.frames[0];
    assert_eq!(top.path.as_deref(), Some(Path::new("/proj/src/reader.c")));
    assert_eq!(top.line, Some(12));
    assert_eq!(top.function.as_deref(), Some("read_value"));
    assert_eq!(top.object.as_deref(), Some("/proj/build/app"));
    assert_eq!(top.ip.as_deref(), Some("0x400544"));

    let leak = &errors[1];
    assert_eq!(leak.kind, "Leak_DefinitelyLost");
    assert_eq!(
        leak.description(),
        "8 bytes in 1 blocks are definitely lost in loss record 1 of 1"
    );
}

#[test]
fn own_frame_of_parsed_errors() {
    let errors = parse_str(MEMCHECK_REPORT).unwrap();

    let read = select_own_frame(&errors[0].frames, Path::new("/proj")).unwrap();
    assert_eq!(read.path.as_deref(), Some(Path::new("/proj/src/main.c")));

    let leak = select_own_frame(&errors[1].frames, Path::new("/proj")).unwrap();
    assert_eq!(leak.path.as_deref(), Some(Path::new("/proj/src/buffer.c")));
    assert_eq!(leak.line, Some(7));

    assert!(select_own_frame(&errors[1].frames, Path::new("/elsewhere")).is_none());
}

#[test]
fn report_without_errors_is_valid() {
    let errors = parse_str("<valgrindoutput><pid>1</pid></valgrindoutput>").unwrap();
    assert!(errors.is_empty());
}

#[test]
fn structurally_invalid_reports_fail() {
    assert!(matches!(parse_str(""), Err(ValgrindError::MissingRoot)));
    assert!(matches!(
        parse_str("<valgrindoutput><error><kind>X</kind>"),
        Err(ValgrindError::UnexpectedEof)
    ));
    assert!(matches!(
        parse_str("<valgrindoutput><error></valgrindoutput>"),
        Err(ValgrindError::Xml { .. })
    ));
    assert!(matches!(
        parse_str(
            "<valgrindoutput><error><kind>X</kind><stack><frame><file>a.c</file><line>x</line></frame></stack></error></valgrindoutput>"
        ),
        Err(ValgrindError::InvalidLine { .. })
    ));
}

#[test]
fn reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memcheck.xml");
    std::fs::write(&path, MEMCHECK_REPORT).unwrap();
    assert_eq!(parse_report(&path).unwrap().len(), 2);
    assert!(matches!(
        parse_report(&dir.path().join("missing.xml")),
        Err(ValgrindError::Io(_))
    ));
}
