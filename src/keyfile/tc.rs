//! Traffic-control keys (`qdisc.<parent>`, `tfilter.<parent>`).
//!
//! The parent handle lives in the key; the stored value is the rest of
//! the spec. On read the two are recombined: when the parent token is a
//! real handle it is reintroduced with the `parent` keyword, otherwise
//! (e.g. `root`) it stands on its own.

use crate::settings::{Setting, Value};
use crate::types::{parse_tc_handle, TcQdisc, TcTfilter, TC_HANDLE_UNSPEC};

use super::reader::ReadContext;
use super::values::apply;
use super::warn::WarnSeverity;
use super::writer::WriteContext;

fn full_spec(parent: &str, rest: &str) -> String {
    if parse_tc_handle(parent).is_some_and(|h| h != TC_HANDLE_UNSPEC) {
        format!("parent {parent} {rest}")
    } else {
        format!("{parent} {rest}")
    }
}

/// Reader for the `qdiscs` property.
pub(crate) fn qdisc_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    let group = ctx.group.clone();
    let mut qdiscs = Vec::new();

    let keys: Vec<String> = ctx
        .store
        .keys(&group)
        .into_iter()
        .map(str::to_string)
        .collect();
    for qdisc_key in keys {
        let Some(parent) = qdisc_key.strip_prefix("qdisc.") else {
            continue;
        };
        let Some(rest) = ctx.store.get_string(&group, &qdisc_key) else {
            continue;
        };
        match TcQdisc::parse(&full_spec(parent, &rest)) {
            Ok(qdisc) => qdiscs.push(qdisc),
            Err(err) => {
                if !ctx.warn(
                    Some(&qdisc_key),
                    WarnSeverity::Warn,
                    format!("invalid qdisc: {err}"),
                ) {
                    return;
                }
            }
        }
    }

    if !qdiscs.is_empty() {
        apply(setting, key, Value::Qdiscs(qdiscs));
    }
}

/// Writer for the `qdiscs` property.
pub(crate) fn qdisc_writer(ctx: &mut WriteContext<'_>, setting: &Setting, _key: &str, value: &Value) {
    let Value::Qdiscs(qdiscs) = value else {
        return;
    };
    for qdisc in qdiscs {
        ctx.store.set_string(
            setting.name(),
            &format!("qdisc.{}", qdisc.parent_label()),
            &qdisc.rest(),
        );
    }
}

/// Reader for the `tfilters` property.
pub(crate) fn tfilter_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    let group = ctx.group.clone();
    let mut tfilters = Vec::new();

    let keys: Vec<String> = ctx
        .store
        .keys(&group)
        .into_iter()
        .map(str::to_string)
        .collect();
    for tfilter_key in keys {
        let Some(parent) = tfilter_key.strip_prefix("tfilter.") else {
            continue;
        };
        let Some(rest) = ctx.store.get_string(&group, &tfilter_key) else {
            continue;
        };
        match TcTfilter::parse(&full_spec(parent, &rest)) {
            Ok(tfilter) => tfilters.push(tfilter),
            Err(err) => {
                if !ctx.warn(
                    Some(&tfilter_key),
                    WarnSeverity::Warn,
                    format!("invalid tfilter: {err}"),
                ) {
                    return;
                }
            }
        }
    }

    if !tfilters.is_empty() {
        apply(setting, key, Value::Tfilters(tfilters));
    }
}

/// Writer for the `tfilters` property.
pub(crate) fn tfilter_writer(
    ctx: &mut WriteContext<'_>,
    setting: &Setting,
    _key: &str,
    value: &Value,
) {
    let Value::Tfilters(tfilters) = value else {
        return;
    };
    for tfilter in tfilters {
        ctx.store.set_string(
            setting.name(),
            &format!("tfilter.{}", tfilter.parent_label()),
            &tfilter.rest(),
        );
    }
}
