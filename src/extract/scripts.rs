//! JavaScript 脚本常量
//!
//! 集中管理在页面中执行的脚本。属性读取脚本以 `this` 绑定到目标元素，
//! 一次往返返回该元素的全部定位属性。

/// 元素属性批量读取脚本
///
/// 参数: 文本片段最大长度（字符数）。只有修剪后长度小于该值的文本才会返回。
/// `id` 与 `class` 读取属性而非 DOM 属性，表单的同名子控件不会遮蔽它们。
pub const EXTRACT_ATTRIBUTES_SCRIPT: &str = r#"
function(maxTextLength) {
    if (!this || !this.isConnected) return null;

    const attr = (name) => {
        const value = this.getAttribute(name);
        return value === null ? null : value;
    };

    const raw = typeof this.innerText === 'string' ? this.innerText : (this.textContent || '');
    const trimmed = raw.trim();

    return {
        tag: this.tagName.toLowerCase(),
        id: attr('id'),
        class: attr('class'),
        role: attr('role'),
        placeholder: attr('placeholder'),
        testId: attr('data-testid'),
        title: attr('title'),
        name: attr('name'),
        alt: attr('alt'),
        text: trimmed.length > 0 && trimmed.length < maxTextLength ? trimmed : null
    };
}
"#;
