pub(crate) const WELCOME: &str = "👋 *مرحباً! بوت البحث عن علامات الطلاب*

📝 *كيفية الاستخدام:*
أرسل الرقم الجامعي للطالب للحصول على علاماته

⚠️ *ملاحظات:*
• الرقم يجب أن يكون مكوناً من أرقام فقط
• يتم جلب البيانات من الموقع الرسمي
• يظهر آخر تحديث للعلامات

🔍 *مثال:* `202112345`

للمساعدة أرسل `/help`";

pub(crate) const HELP: &str = "📖 *مساعدة البوت*

🔧 *الأوامر المتاحة:*
• `/start` - بدء البوت
• `/help` - عرض هذه المساعدة

📝 *كيفية البحث:*
1. أرسل الرقم الجامعي (أرقام فقط)
2. انتظر حتى يتم جلب البيانات
3. ستحصل على جميع المواد والعلامات

🎯 *معلومات العرض:*
• اسم الطالب والسنة الدراسية
• جميع المواد مع العلامات
• حالة النجاح/الرسوب لكل مادة
• المعدل العام والتقييم

❓ *للمشاكل:*
• تأكد من الرقم الجامعي الصحيح
• تحقق من الاتصال بالإنترنت
• حاول مرة أخرى لاحقاً";

pub(crate) const INVALID_ID: &str =
    "❌ الرقم الجامعي يجب أن يكون مكوناً من أرقام فقط\n\n📝 *مثال:* `202112345`";

pub(crate) const SEARCHING: &str = "🔍 *جاري البحث عن بيانات الطالب...*";

pub(crate) const NOT_FOUND: &str = "❌ لم يتم العثور على الطالب\n\n🔍 *تأكد من:*\n\
     • الرقم الجامعي الصحيح\n\
     • وجود الطالب في النظام\n\
     • الاتصال بالإنترنت";

pub(crate) const UNKNOWN_COMMAND: &str = "❓ أمر غير معروف\n\nأرسل `/help` لعرض الأوامر المتاحة";
