//! Static catalog of the nine essentials.
//!
//! This is a read-only lookup table keyed by language and principle id. The
//! detailed context used for prompting is language independent and shared by
//! every translation.

use crate::experience::Principle;
use crate::language::Language;

/// Number of principles in the catalog. Ids run from 1 to this value.
pub const PRINCIPLE_COUNT: u32 = 9;

const CONTEXTS: [&str; PRINCIPLE_COUNT as usize] = [
    "Move often and bring attention to what you feel as you move. Your brain will start building billions of new connections, creating new possibilities and transformation.",
    "Slow way down to learn new skills and overcome limitations. Fast you can only do what you already know. Slow stimulates the formation of rich new neural patterns.",
    "Introduce variation (call it play, mistakes, exploration) into everything you do. Your brain will create new possibilities in your movements, feelings, thoughts, and action.",
    "Reduce the force with which you move, think, and act. Develop greater sensitivity that will enhance your brain’s ability to perceive the finest of differences, and therefore learn.",
    "Enthusiasm is a skill you can develop. It is a choice to appreciate and take delight in the small things. It amplifies what is important and grooves in new learning in your brain.",
    "If you knew how to reach your goal, you’d already be there. Embrace unexpected steps and mistakes along the way. With this rich information, discover the path to achieving your goal.",
    "The brain is either in a learning mode—or not. Expect that you will do, think, or learn something NEW in each situation, even familiar ones, to turn your learning switch ON.",
    "Imagine and dream! With imagination, you can create what has never been there before. Dreams call you and guide you from your future. Both will elevate you to new heights, transcending your limitations.",
    "Become aware of what you are doing, sensing, thinking, and experiencing at any moment. Awareness is an action. When you are aware, you are fully alive and present.",
];

type Entry = (&'static str, &'static str);

const TR: [Entry; PRINCIPLE_COUNT as usize] = [
    ("Hareket ve Dikkat", "Sıkça hareket et ve hareket ederken ne hissettiğine dikkatini ver. Beynin milyarlarca yeni bağlantı kurmaya başlayacak, yeni olasılıklar ve dönüşüm yaratacaktır."),
    ("Yavaşlık", "Yeni beceriler öğrenmek ve kısıtlamaları aşmak için iyice yavaşla. Hızlıyken sadece bildiğini yapabilirsin. Yavaşlık, zengin yeni nöral kalıpların oluşumunu uyarır."),
    ("Varyasyon", "Yaptığın her şeye varyasyon (oyun, hatalar, keşif) kat. Beynin hareketlerinde, duygularında, düşüncelerinde ve eylemlerinde yeni olasılıklar yaratacaktır."),
    ("İncelik (Subtlety)", "Hareket ederken, düşünürken ve eyleme geçerken kullandığın gücü azalt. Beyninin en ince farklılıkları algılama yeteneğini artıracak hassasiyeti geliştir."),
    ("Coşku", "Coşku geliştirilebilir bir beceridir. Küçük şeyleri takdir etme ve onlardan keyif alma seçimidir. Önemli olanı güçlendirir ve beynine yeni öğrenilenleri kazır."),
    ("Esnek Hedefler", "Hedefine nasıl ulaşacağını bilseydin, zaten orada olurdun. Yol boyunca beklenmedik adımları ve hataları kucakla. Bu zengin bilgiyle, hedefine ulaşma yolunu keşfet."),
    ("Öğrenme Şalteri", "Beyin ya öğrenme modundadır ya da değildir. Şalteri AÇMAK için her durumda, tanıdık olanlarda bile, YENİ bir şey yapmayı, düşünmeyi veya öğrenmeyi bekle."),
    ("Hayal Gücü ve Rüyalar", "Hayal et ve düşle! Hayal gücüyle, daha önce hiç var olmamış şeyleri yaratabilirsin. Rüyalar seni çağırır ve geleceğinden rehberlik eder."),
    ("Farkındalık", "Her an ne yaptığının, duyumsadığının, düşündüğünün ve deneyimlediğinin farkında ol. Farkındalık bir eylemdir. Farkında olduğunda, tamamen canlı ve andasındır."),
];

const EN: [Entry; PRINCIPLE_COUNT as usize] = [
    ("Movement with Attention", "Move often and bring attention to what you feel as you move. Your brain will start building billions of new connections, creating new possibilities and transformation."),
    ("Slow", "Slow way down to learn new skills and overcome limitations. Fast you can only do what you already know. Slow stimulates the formation of rich new neural patterns."),
    ("Variation", "Introduce variation (call it play, mistakes, exploration) into everything you do. Your brain will create new possibilities in your movements, feelings, thoughts, and action."),
    ("Subtlety", "Reduce the force with which you move, think, and act. Develop greater sensitivity that will enhance your brain’s ability to perceive the finest of differences, and therefore learn."),
    ("Enthusiasm", "Enthusiasm is a skill you can develop. It is a choice to appreciate and take delight in the small things. It amplifies what is important and grooves in new learning in your brain."),
    ("Flexible Goals", "If you knew how to reach your goal, you’d already be there. Embrace unexpected steps and mistakes along the way. With this rich information, discover the path to achieving your goal."),
    ("The Learning Switch", "The brain is either in a learning mode—or not. Expect that you will do, think, or learn something NEW in each situation, even familiar ones, to turn your learning switch ON."),
    ("Imagination & Dreams", "Imagine and dream! With imagination, you can create what has never been there before. Dreams call you and guide you from your future."),
    ("Awareness", "Become aware of what you are doing, sensing, thinking, and experiencing at any moment. Awareness is an action. When you are aware, you are fully alive and present."),
];

const DE: [Entry; PRINCIPLE_COUNT as usize] = [
    ("Bewegung mit Aufmerksamkeit", "Bewege dich oft und richte deine Aufmerksamkeit darauf, was du fühlst. Dein Gehirn wird beginnen, Milliarden neuer Verbindungen aufzubauen, was neue Möglichkeiten schafft."),
    ("Langsam", "Werde sehr langsam, um neue Fähigkeiten zu erlernen. Schnell kannst du nur das tun, was du bereits kennst. Langsamkeit stimuliert neue neuronale Muster."),
    ("Variation", "Bringe Variation (Spiel, Fehler, Erkundung) in alles ein. Dein Gehirn wird neue Möglichkeiten in deinen Bewegungen, Gefühlen und Gedanken schaffen."),
    ("Subtilität", "Reduziere die Kraft, mit der du dich bewegst und denkst. Entwickle eine größere Sensibilität, um feinste Unterschiede wahrzunehmen und zu lernen."),
    ("Begeisterung", "Begeisterung ist eine Fähigkeit. Es ist eine Entscheidung, die kleinen Dinge zu schätzen. Sie verstärkt, was wichtig ist, und vertieft neues Lernen."),
    ("Flexible Ziele", "Umarme unerwartete Schritte und Fehler auf dem Weg. Entdecke mit dieser reichen Information den Weg zum Erreichen deines Ziels."),
    ("Der Lernschalter", "Das Gehirn ist entweder im Lernmodus – oder nicht. Erwarte, in jeder Situation etwas NEUES zu tun oder zu lernen, um den Lernschalter einzuschalten."),
    ("Vorstellungskraft & Träume", "Stelle dir vor und träume! Mit Vorstellungskraft kannst du erschaffen, was noch nie da war. Beide werden dich zu neuen Höhen heben."),
    ("Bewusstheit", "Werde dir dessen bewusst, was du in jedem Moment tust und erlebst. Bewusstheit ist eine Handlung. Wenn du bewusst bist, bist du voll lebendig und präsent."),
];

fn entries(language: Language) -> &'static [Entry; PRINCIPLE_COUNT as usize] {
    match language {
        Language::Tr => &TR,
        Language::En => &EN,
        Language::De => &DE,
    }
}

/// Detailed context for a principle id, if the id is in the catalog.
pub fn context_for(id: u32) -> Option<&'static str> {
    let index = usize::try_from(id.checked_sub(1)?).ok()?;
    CONTEXTS.get(index).copied()
}

/// All principles for a language, ordered by id.
pub fn principles(language: Language) -> Vec<Principle> {
    entries(language)
        .iter()
        .zip(1..)
        .map(|(&(title, description), id)| Principle {
            id,
            title: title.to_string(),
            description: description.to_string(),
            context_text: context_for(id).unwrap_or(description).to_string(),
        })
        .collect()
}

/// Looks up a single principle by id.
pub fn principle(language: Language, id: u32) -> Option<Principle> {
    principles(language).into_iter().find(|p| p.id == id)
}
