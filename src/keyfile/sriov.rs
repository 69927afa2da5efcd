//! SR-IOV virtual function keys (`vf.<N>`).

use tracing::debug;

use crate::settings::{Setting, Value};
use crate::types::SriovVf;

use super::reader::ReadContext;
use super::values::apply;
use super::writer::WriteContext;

/// Reader for the `vfs` property: every `vf.<N>` key of the group
/// contributes one descriptor, collected in ascending index order.
/// Undecodable descriptors are dropped.
pub(crate) fn sriov_vfs_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    let group = ctx.group.clone();
    let mut vfs = Vec::new();

    let keys: Vec<String> = ctx
        .store
        .keys(&group)
        .into_iter()
        .map(str::to_string)
        .collect();
    for vf_key in keys {
        let Some(index) = vf_key.strip_prefix("vf.") else {
            continue;
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Some(value) = ctx.store.get_string(&group, &vf_key) else {
            continue;
        };
        match SriovVf::parse(&format!("{index} {value}")) {
            Ok(vf) => vfs.push(vf),
            Err(err) => debug!("[{group}] dropping '{vf_key}': {err}"),
        }
    }

    vfs.sort_by_key(|vf| vf.index);
    if !vfs.is_empty() {
        apply(setting, key, Value::Vfs(vfs));
    }
}

/// Writer for the `vfs` property: one `vf.<N>` key per descriptor.
pub(crate) fn sriov_vfs_writer(
    ctx: &mut WriteContext<'_>,
    setting: &Setting,
    _key: &str,
    value: &Value,
) {
    let Value::Vfs(vfs) = value else {
        return;
    };
    for vf in vfs {
        ctx.store.set_string(
            setting.name(),
            &format!("vf.{}", vf.index),
            &vf.format_attributes(),
        );
    }
}
